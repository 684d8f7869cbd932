use chrono::Local;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::{self, auth, Backend};
use crate::browser;
use crate::components::auth_screen::AuthScreen;
use crate::components::calendar_page::CalendarPage;
use crate::components::categories_page::CategoriesPage;
use crate::components::expenses_page::ExpensesPage;
use crate::components::layout::{Layout, Page};
use crate::components::settings_page::SettingsPage;
use crate::components::stats_page::StatsPage;
use crate::components::Tracker;
use crate::config::AppConfig;
use crate::model::Session;
use crate::view_state::{ViewAction, ViewState};

#[derive(Clone, PartialEq)]
enum AuthStatus {
    Checking,
    Authenticated(Session),
    Unauthenticated,
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_state(AppConfig::from_build_env);
    let auth_status = use_state(|| AuthStatus::Checking);

    {
        let config = (*config).clone();
        let auth_status = auth_status.clone();
        use_effect_with_deps(
            move |_| {
                match browser::load_session() {
                    None => auth_status.set(AuthStatus::Unauthenticated),
                    Some(session) => spawn_local(async move {
                        auth_status.set(restore_session(&config, session).await);
                    }),
                }
                || ()
            },
            (),
        );
    }

    let on_authenticated = {
        let auth_status = auth_status.clone();
        Callback::from(move |session: Session| {
            browser::save_session(&session);
            auth_status.set(AuthStatus::Authenticated(session));
        })
    };

    let renewing = use_mut_ref(|| false);
    let on_unauthorized = {
        let auth_status = auth_status.clone();
        let config = (*config).clone();
        Callback::from(move |_| {
            let AuthStatus::Authenticated(session) = &*auth_status else {
                return;
            };
            if renewing.replace(true) {
                return;
            }
            let auth_status = auth_status.clone();
            let config = config.clone();
            let session = session.clone();
            let renewing = renewing.clone();
            spawn_local(async move {
                match auth::refresh(&config, &session).await {
                    Ok(renewed) => {
                        browser::save_session(&renewed);
                        auth_status.set(AuthStatus::Authenticated(renewed));
                        browser::alert("Your session was renewed. Please repeat the last action.");
                    }
                    Err(err) => {
                        log::warn!("could not renew session: {}", err);
                        browser::clear_session();
                        auth_status.set(AuthStatus::Unauthenticated);
                        browser::alert("Your session has expired. Please sign in again.");
                    }
                }
                *renewing.borrow_mut() = false;
            });
        })
    };

    let on_sign_out = {
        let auth_status = auth_status.clone();
        let config = (*config).clone();
        Callback::from(move |_| {
            if let AuthStatus::Authenticated(session) = &*auth_status {
                let config = config.clone();
                let session = session.clone();
                spawn_local(async move {
                    if let Err(err) = auth::sign_out(&config, &session).await {
                        log::warn!("sign-out request failed: {}", err);
                    }
                });
            }
            browser::clear_session();
            auth_status.set(AuthStatus::Unauthenticated);
        })
    };

    match &*auth_status {
        AuthStatus::Checking => html! {
            <div class="min-h-screen flex items-center justify-center bg-background text-muted-foreground">
                {"Checking session..."}
            </div>
        },
        AuthStatus::Unauthenticated => html! {
            <AuthScreen config={(*config).clone()} on_authenticated={on_authenticated} />
        },
        AuthStatus::Authenticated(session) => html! {
            <TrackerShell
                key={session.user.id.clone()}
                backend={Backend::new((*config).clone(), session.clone())}
                on_sign_out={on_sign_out}
                on_unauthorized={on_unauthorized}
            />
        },
    }
}

/// Validates a stored session, renewing it once when the access token expired.
async fn restore_session(config: &AppConfig, session: Session) -> AuthStatus {
    match auth::current_user(config, &session).await {
        Ok(_) => AuthStatus::Authenticated(session),
        Err(err) if err.is_unauthorized() => match auth::refresh(config, &session).await {
            Ok(renewed) => {
                browser::save_session(&renewed);
                AuthStatus::Authenticated(renewed)
            }
            Err(err) if err.is_unauthorized() => {
                log::info!("stored session expired");
                browser::clear_session();
                AuthStatus::Unauthenticated
            }
            Err(err) => {
                log::warn!("could not renew stored session: {}", err);
                AuthStatus::Authenticated(session)
            }
        },
        Err(err) => {
            // keep the stored session when the check itself failed
            log::warn!("could not verify stored session: {}", err);
            AuthStatus::Authenticated(session)
        }
    }
}

#[derive(Properties, PartialEq)]
struct TrackerShellProps {
    backend: Backend,
    on_sign_out: Callback<()>,
    on_unauthorized: Callback<()>,
}

#[function_component(TrackerShell)]
fn tracker_shell(props: &TrackerShellProps) -> Html {
    let state = use_reducer(|| ViewState::new(Local::now().date_naive()));
    let active_page = use_state(|| Page::Expenses);
    let loading = use_state(|| true);

    let tracker = Tracker {
        backend: props.backend.clone(),
        state: state.clone(),
        on_unauthorized: props.on_unauthorized.clone(),
    };

    {
        let tracker = tracker.clone();
        let loading = loading.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    match api::load_dashboard(&tracker.backend).await {
                        Ok(dashboard) => tracker.dispatch(ViewAction::Loaded(dashboard)),
                        Err(err) => tracker.fail("Could not load expenses", err),
                    }
                    loading.set(false);
                });
                || ()
            },
            props.backend.session.access_token.clone(),
        );
    }

    let on_select = {
        let active_page = active_page.clone();
        Callback::from(move |page: Page| active_page.set(page))
    };

    let content = if *loading {
        html! { <div class="p-6 text-muted-foreground">{"Loading..."}</div> }
    } else {
        match *active_page {
            Page::Expenses => html! { <ExpensesPage /> },
            Page::Statistics => html! { <StatsPage /> },
            Page::Calendar => html! { <CalendarPage on_show_day={on_select.reform(|_| Page::Expenses)} /> },
            Page::Categories => html! { <CategoriesPage /> },
            Page::Settings => html! { <SettingsPage /> },
        }
    };

    html! {
        <ContextProvider<Tracker> context={tracker}>
            <Layout
                active_page={*active_page}
                on_select={on_select}
                on_sign_out={props.on_sign_out.clone()}
                email={props.backend.session.user.email.clone().unwrap_or_default()}
                currency={state.currency.clone()}
            >
                { content }
            </Layout>
        </ContextProvider<Tracker>>
    }
}

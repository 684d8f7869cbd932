use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::auth::{self, Credentials, SignUpOutcome};
use crate::config::AppConfig;
use crate::model::Session;

#[derive(Properties, PartialEq)]
pub struct AuthScreenProps {
    pub config: AppConfig,
    pub on_authenticated: Callback<Session>,
}

#[function_component(AuthScreen)]
pub fn auth_screen(props: &AuthScreenProps) -> Html {
    let is_login = use_state(|| true);
    let email = use_state(|| "".to_string());
    let password = use_state(|| "".to_string());
    let confirm_password = use_state(|| "".to_string());
    let error = use_state(|| None::<String>);
    let notice = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let on_submit = {
        let is_login = is_login.clone();
        let email = email.clone();
        let password = password.clone();
        let confirm_password = confirm_password.clone();
        let error = error.clone();
        let notice = notice.clone();
        let loading = loading.clone();
        let config = props.config.clone();
        let on_authenticated = props.on_authenticated.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            notice.set(None);
            let signing_in = *is_login;
            let confirm = (!signing_in).then(|| (*confirm_password).clone());
            let credentials = match Credentials::validate(&email, &password, confirm.as_deref()) {
                Ok(credentials) => credentials,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            loading.set(true);
            error.set(None);

            let config = config.clone();
            let on_authenticated = on_authenticated.clone();
            let is_login = is_login.clone();
            let error = error.clone();
            let notice = notice.clone();
            let loading = loading.clone();
            spawn_local(async move {
                let outcome = if signing_in {
                    auth::sign_in(&config, &credentials).await.map(SignUpOutcome::SignedIn)
                } else {
                    auth::sign_up(&config, &credentials).await
                };
                loading.set(false);
                match outcome {
                    Ok(SignUpOutcome::SignedIn(session)) => on_authenticated.emit(session),
                    Ok(SignUpOutcome::ConfirmationRequired) => {
                        notice.set(Some(
                            "Registration successful. Confirm your email, then sign in.".to_string(),
                        ));
                        is_login.set(true);
                    }
                    Err(err) => {
                        log::error!("authentication failed: {}", err);
                        error.set(Some(err.to_string()));
                    }
                }
            });
        })
    };

    let switch_to = |login: bool| {
        let is_login = is_login.clone();
        let error = error.clone();
        let notice = notice.clone();
        Callback::from(move |_| {
            is_login.set(login);
            error.set(None);
            notice.set(None);
        })
    };

    let tab_class = |active: bool| {
        if active {
            "flex-1 py-2 text-sm font-semibold border-b-2 border-primary text-foreground"
        } else {
            "flex-1 py-2 text-sm text-muted-foreground border-b border-border"
        }
    };

    let text_input = |kind: &'static str, state: &UseStateHandle<String>| {
        let state = state.clone();
        html! {
            <input
                type={kind}
                class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary"
                value={(*state).clone()}
                oninput={Callback::from(move |e: InputEvent| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    state.set(input.value());
                })}
            />
        }
    };

    html! {
        <div class="min-h-screen flex items-center justify-center bg-background">
            <div class="w-full max-w-md bg-card border border-border rounded-2xl shadow-lg p-8">
                <div class="flex mb-6">
                    <button type="button" class={tab_class(*is_login)} onclick={switch_to(true)}>{"Sign in"}</button>
                    <button type="button" class={tab_class(!*is_login)} onclick={switch_to(false)}>{"Sign up"}</button>
                </div>

                <form class="space-y-4" onsubmit={on_submit}>
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-foreground">{"Email"}</label>
                        { text_input("email", &email) }
                    </div>
                    <div class="space-y-1">
                        <label class="text-sm font-medium text-foreground">{"Password"}</label>
                        { text_input("password", &password) }
                    </div>

                    if !*is_login {
                        <div class="space-y-1">
                            <label class="text-sm font-medium text-foreground">{"Confirm Password"}</label>
                            { text_input("password", &confirm_password) }
                        </div>
                    }

                    if let Some(msg) = &*error {
                        <div class="error-message text-sm text-red-500">{ msg.clone() }</div>
                    }
                    if let Some(msg) = &*notice {
                        <div class="success-message text-sm text-green-600">{ msg.clone() }</div>
                    }

                    <button
                        type="submit"
                        class="w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold hover:opacity-90 transition-opacity"
                        disabled={*loading}
                    >
                        { if *loading { "Please wait..." } else if *is_login { "Sign in" } else { "Create account" } }
                    </button>
                </form>
            </div>
        </div>
    }
}

use std::rc::Rc;

use yew::prelude::*;

use crate::api::Backend;
use crate::browser;
use crate::error::AppError;
use crate::view_state::{ViewAction, ViewState};

pub mod auth_screen;
pub mod calendar_page;
pub mod categories_page;
pub mod expenses_page;
pub mod icons;
pub mod layout;
pub mod settings_page;
pub mod stats_page;

impl Reducible for ViewState {
    type Action = ViewAction;

    fn reduce(self: Rc<Self>, action: ViewAction) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        next.into()
    }
}

/// Shared by every page once the user is signed in.
#[derive(Clone, PartialEq)]
pub struct Tracker {
    pub backend: Backend,
    pub state: UseReducerHandle<ViewState>,
    pub on_unauthorized: Callback<()>,
}

impl Tracker {
    pub fn dispatch(&self, action: ViewAction) {
        self.state.dispatch(action);
    }

    /// Reports a failed remote call. An expired session is handed to the app
    /// shell, which renews it or signs the user out.
    pub fn fail(&self, action: &str, err: AppError) {
        if err.is_unauthorized() {
            log::warn!("{}: {}", action, err);
            self.on_unauthorized.emit(());
            return;
        }
        browser::report(action, &err);
    }
}

pub fn page_shell(title: &'static str, actions: Html, children: Html) -> Html {
    html! {
        <div class="p-6 space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-2xl font-black text-[#173E63]">{ title }</h1>
                { actions }
            </div>
            { children }
        </div>
    }
}

pub fn empty_state(message: &'static str) -> Html {
    html! { <p class="no-data px-6 py-8 text-center text-muted-foreground">{ message }</p> }
}

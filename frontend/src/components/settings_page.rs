use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::{page_shell, Tracker};
use crate::api::{rates, settings};
use crate::currency::{currency_symbol_for, SUPPORTED_CURRENCIES};
use crate::view_state::ViewAction;

/// The code the currency control shows: the one being saved, if any,
/// otherwise the stored one.
fn shown_currency<'a>(stored: &'a str, pending: Option<&'a str>) -> &'a str {
    pending.unwrap_or(stored)
}

#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
    let pending = use_state(|| None::<String>);
    let select_ref = use_node_ref();
    let tracker = use_context::<Tracker>();
    let Some(tracker) = tracker else {
        return html! {};
    };
    let current_currency = tracker.state.currency.clone();
    let shown = shown_currency(&current_currency, pending.as_deref()).to_string();

    let on_currency_change = {
        let tracker = tracker.clone();
        let current_currency = current_currency.clone();
        let pending = pending.clone();
        let select_ref = select_ref.clone();
        Callback::from(move |e: Event| {
            let input: web_sys::HtmlSelectElement = e.target_unchecked_into();
            let code = input.value();
            if code == current_currency {
                return;
            }
            pending.set(Some(code.clone()));
            let tracker = tracker.clone();
            let previous = current_currency.clone();
            let pending = pending.clone();
            let select_ref = select_ref.clone();
            spawn_local(async move {
                match settings::save(&tracker.backend, &code).await {
                    Ok(_) => {
                        let rates = rates::fetch_or_identity(&tracker.backend.config, &code).await;
                        tracker.dispatch(ViewAction::CurrencyChanged { currency: code, rates });
                    }
                    Err(err) => {
                        if let Some(select) = select_ref.cast::<web_sys::HtmlSelectElement>() {
                            select.set_value(&previous);
                        }
                        tracker.fail("Could not save the currency", err);
                    }
                }
                pending.set(None);
            });
        })
    };

    html! {
        { page_shell(
            "Settings",
            html! {},
            html! {
                <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                    <div class="bg-card rounded-lg p-6 border border-border">
                        <h2 class="text-xl font-bold text-foreground mb-6">{"Preferences"}</h2>
                        <label class="block text-sm font-medium text-foreground mb-2">{"Currency"}</label>
                        <select ref={select_ref} onchange={on_currency_change} disabled={pending.is_some()} class="w-full px-4 py-2 bg-input border border-input rounded-lg text-foreground focus:outline-none focus:ring-2 focus:ring-primary">
                            { for SUPPORTED_CURRENCIES.iter().map(|code| html! {
                                <option value={*code} selected={*code == shown}>
                                    { format!("{} ({})", code, currency_symbol_for(code)) }
                                </option>
                            }) }
                        </select>
                        <p class="text-xs text-muted-foreground mt-2">{"Totals, statistics and the calendar are shown in this currency."}</p>
                    </div>

                    <div class="bg-card rounded-lg p-6 border border-border">
                        <h2 class="text-xl font-bold text-foreground mb-6">{"Account"}</h2>
                        <p class="text-sm text-foreground">
                            { tracker.backend.session.user.email.clone().unwrap_or_default() }
                        </p>
                        <p class="text-xs text-muted-foreground mt-2">
                            { format!("{} expenses, {} categories", tracker.state.expenses.len(), tracker.state.categories.len()) }
                        </p>
                    </div>
                </div>
            }
        ) }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn control_falls_back_to_stored_currency() {
        assert_eq!(shown_currency("USD", Some("EUR")), "EUR");
        assert_eq!(shown_currency("USD", None), "USD");
    }
}

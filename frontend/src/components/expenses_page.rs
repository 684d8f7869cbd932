use chrono::Local;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::icons::{icon_plus, icon_trash};
use super::{empty_state, page_shell, Tracker};
use crate::api::expenses;
use crate::browser;
use crate::config::FALLBACK_CATEGORY;
use crate::currency::SUPPORTED_CURRENCIES;
use crate::format::{format_money, format_timestamp};
use crate::model::{Expense, ExpenseForm};
use crate::view_state::{CategoryFilter, SortOrder, ViewAction};

#[function_component(ExpensesPage)]
pub fn expenses_page() -> Html {
    let tracker = use_context::<Tracker>();
    let Some(tracker) = tracker else {
        return html! {};
    };
    let state = &tracker.state;

    html! {
        { page_shell(
            "Expenses",
            html! {},
            html! {
                <>
                    <AddExpenseForm tracker={tracker.clone()} />
                    <div class="bg-card rounded-2xl shadow-md border border-border overflow-hidden">
                        <div class="p-5 border-b border-border flex flex-wrap items-center gap-4">
                            <h3 class="font-bold text-lg text-foreground flex-1">{"History"}</h3>
                            { selected_date_chip(&tracker) }
                            { filter_select(&tracker) }
                            { sort_select(&tracker) }
                        </div>
                        { expense_table(&tracker) }
                        <div class="p-5 border-t border-border text-right font-bold text-[#173E63]">
                            { format!("Total: {}", format_money(state.total(&Local), &state.currency)) }
                        </div>
                    </div>
                </>
            }
        ) }
    }
}

fn selected_date_chip(tracker: &Tracker) -> Html {
    let Some(date) = tracker.state.selected_date else {
        return html! {};
    };
    let on_clear = {
        let tracker = tracker.clone();
        Callback::from(move |_| tracker.dispatch(ViewAction::ClearDate))
    };
    html! {
        <button onclick={on_clear} class="bg-secondary text-secondary-foreground px-3 py-1 rounded-full text-[11px] font-bold">
            { format!("{} ✕", date.format("%d.%m.%Y")) }
        </button>
    }
}

fn filter_select(tracker: &Tracker) -> Html {
    let on_change = {
        let tracker = tracker.clone();
        Callback::from(move |e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            tracker.dispatch(ViewAction::Filter(CategoryFilter::from_select(&select.value())));
        })
    };
    let current = tracker.state.filter.select_value().to_string();
    html! {
        <select onchange={on_change} class="bg-[#f1f4f9] rounded-[10px] px-3 py-2 text-[12px] text-[#173E63]">
            <option value="all" selected={current == "all"}>{"All categories"}</option>
            { for tracker.state.categories.iter().map(|c| html! {
                <option value={c.name.clone()} selected={current == c.name}>{ c.name.clone() }</option>
            }) }
        </select>
    }
}

fn sort_select(tracker: &Tracker) -> Html {
    let on_change = {
        let tracker = tracker.clone();
        Callback::from(move |e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            tracker.dispatch(ViewAction::Sort(SortOrder::from_key(&select.value())));
        })
    };
    let current = tracker.state.sort;
    html! {
        <select onchange={on_change} class="bg-[#f1f4f9] rounded-[10px] px-3 py-2 text-[12px] text-[#173E63]">
            { for SortOrder::ALL.into_iter().map(|order| html! {
                <option value={order.key()} selected={order == current}>{ order.label() }</option>
            }) }
        </select>
    }
}

fn expense_table(tracker: &Tracker) -> Html {
    let state = &tracker.state;
    let visible = state.visible(&Local);
    if visible.is_empty() {
        return empty_state("No expenses to display");
    }
    let conv = state.converter();

    html! {
        <div class="overflow-x-auto">
            <table class="w-full text-left border-collapse">
                <thead>
                    <tr class="bg-muted text-muted-foreground text-[10px] uppercase tracking-widest">
                        <th class="px-8 py-4 font-bold">{"Date"}</th>
                        <th class="px-8 py-4 font-bold">{"Category"}</th>
                        <th class="px-8 py-4 font-bold">{"Description"}</th>
                        <th class="px-8 py-4 font-bold">{"Amount"}</th>
                        <th class="px-8 py-4 font-bold">{"Action"}</th>
                    </tr>
                </thead>
                <tbody class="divide-y divide-border">
                    { for visible.into_iter().map(|item| {
                        let original = (item.currency != state.currency)
                            .then(|| format_money(item.amount, &item.currency));
                        html! {
                            <tr key={item.id} class="expense-item text-sm hover:bg-muted/40 transition-colors group">
                                <td class="px-8 py-4 text-muted-foreground">{ format_timestamp(&item.created_at, &Local) }</td>
                                <td class="px-8 py-4">
                                    <span class="bg-secondary text-secondary-foreground px-3 py-1 rounded-full text-[10px] font-bold">{ item.category.clone() }</span>
                                </td>
                                <td class="px-8 py-4 text-foreground">{ item.description().to_string() }</td>
                                <td class="px-8 py-4 font-semibold text-foreground">
                                    { format_money(conv.amount_of(item), &state.currency) }
                                    if let Some(original) = original {
                                        <span class="block text-[10px] text-muted-foreground">{ original }</span>
                                    }
                                </td>
                                <td class="px-8 py-4">
                                    <button class="btn btn-danger" onclick={delete_callback(tracker, item)}>{ icon_trash() }</button>
                                </td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        </div>
    }
}

fn delete_callback(tracker: &Tracker, expense: &Expense) -> Callback<MouseEvent> {
    let tracker = tracker.clone();
    let id = expense.id;
    Callback::from(move |_| {
        if !browser::confirm("Delete this expense?") {
            return;
        }
        let tracker = tracker.clone();
        spawn_local(async move {
            match expenses::delete(&tracker.backend, id).await {
                Ok(()) => tracker.dispatch(ViewAction::ExpenseDeleted(id)),
                Err(err) => tracker.fail("Could not delete the expense", err),
            }
        });
    })
}

#[derive(Properties, PartialEq)]
struct AddExpenseFormProps {
    tracker: Tracker,
}

#[function_component(AddExpenseForm)]
fn add_expense_form(props: &AddExpenseFormProps) -> Html {
    let tracker = &props.tracker;
    let default_category = tracker
        .state
        .categories
        .first()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    let form_amount = use_state(|| "".to_string());
    let form_category = use_state(|| default_category.clone());
    let form_description = use_state(|| "".to_string());
    let form_currency = use_state(|| tracker.state.currency.clone());
    let form_date = use_state(|| "".to_string());
    let form_error = use_state(|| None::<String>);
    let saving = use_state(|| false);

    let on_submit = {
        let tracker = tracker.clone();
        let form_amount = form_amount.clone();
        let form_category = form_category.clone();
        let form_description = form_description.clone();
        let form_currency = form_currency.clone();
        let form_date = form_date.clone();
        let form_error = form_error.clone();
        let saving = saving.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let form = ExpenseForm {
                amount: (*form_amount).clone(),
                category: (*form_category).clone(),
                description: (*form_description).clone(),
                currency: (*form_currency).clone(),
                date: (*form_date).clone(),
            };
            let new_expense = match form.validate(tracker.backend.user_id(), Local::now()) {
                Ok(new_expense) => new_expense,
                Err(err) => {
                    form_error.set(Some(err.to_string()));
                    return;
                }
            };
            form_error.set(None);
            saving.set(true);

            let tracker = tracker.clone();
            let form_amount = form_amount.clone();
            let form_description = form_description.clone();
            let form_date = form_date.clone();
            let saving = saving.clone();
            spawn_local(async move {
                match expenses::insert(&tracker.backend, &new_expense).await {
                    Ok(created) => {
                        tracker.dispatch(ViewAction::ExpenseAdded(created));
                        form_amount.set("".to_string());
                        form_description.set("".to_string());
                        form_date.set("".to_string());
                    }
                    Err(err) => tracker.fail("Could not add the expense", err),
                }
                saving.set(false);
            });
        })
    };

    let text_input = |kind: &'static str, placeholder: &'static str, state: &UseStateHandle<String>| {
        let state = state.clone();
        html! {
            <input type={kind} placeholder={placeholder} value={(*state).clone()} oninput={Callback::from(move |e: InputEvent| {
                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                state.set(input.value());
            })} class="w-full bg-[#f1f4f9] rounded-[10px] px-3 py-2 text-[11px] text-[#173E63] border-none" />
        }
    };

    let select_input = |options: Vec<String>, state: &UseStateHandle<String>| {
        let state = state.clone();
        let current = (*state).clone();
        html! {
            <select onchange={Callback::from(move |e: Event| {
                let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                state.set(select.value());
            })} class="w-full bg-[#f1f4f9] rounded-[10px] px-3 py-2 text-[11px] text-[#173E63] border-none">
                { for options.into_iter().map(|option| html! {
                    <option value={option.clone()} selected={option == current}>{ option.clone() }</option>
                }) }
            </select>
        }
    };

    let currencies = SUPPORTED_CURRENCIES.iter().map(|c| c.to_string()).collect::<Vec<_>>();

    html! {
        <form onsubmit={on_submit} class="bg-white p-5 rounded-[10px] shadow-sm border border-white/50">
            <h4 class="text-[#1D617A] font-bold text-[15px] mb-3 tracking-wider">{"Add New Expense"}</h4>
            <div class="grid grid-cols-2 md:grid-cols-5 gap-3 mb-4">
                <div class="space-y-1">
                    <label class="text-[12px] font-bold text-muted-foreground">{"Amount"}</label>
                    { text_input("number", "0.00", &form_amount) }
                </div>
                <div class="space-y-1">
                    <label class="text-[12px] font-bold text-muted-foreground">{"Currency"}</label>
                    { select_input(currencies, &form_currency) }
                </div>
                <div class="space-y-1">
                    <label class="text-[12px] font-bold text-muted-foreground">{"Category"}</label>
                    { select_input(tracker.state.category_names(), &form_category) }
                </div>
                <div class="space-y-1">
                    <label class="text-[12px] font-bold text-muted-foreground">{"Description"}</label>
                    { text_input("text", "Optional", &form_description) }
                </div>
                <div class="space-y-1">
                    <label class="text-[12px] font-bold text-muted-foreground">{"Date"}</label>
                    { text_input("date", "", &form_date) }
                </div>
            </div>
            <button type="submit" class="w-full bg-[#173E63] text-white py-2 rounded-[10px] text-[10px] font-bold flex items-center justify-center gap-2" disabled={*saving}>
                { icon_plus() }
                { if *saving { "Saving..." } else { "Add Expense" } }
            </button>
            if let Some(msg) = &*form_error {
                <p class="text-sm text-red-500 mt-3">{ msg.clone() }</p>
            }
        </form>
    }
}

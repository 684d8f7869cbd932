use chrono::Local;
use yew::prelude::*;

use super::{empty_state, page_shell, Tracker};
use crate::currency::currency_symbol_for;
use crate::format::{format_amount, format_money};
use crate::stats::share_percent;

#[function_component(StatsPage)]
pub fn stats_page() -> Html {
    let tracker = use_context::<Tracker>();
    let Some(tracker) = tracker else {
        return html! {};
    };
    let state = &tracker.state;
    let total = state.total(&Local);
    let buckets = state.category_totals(&Local);

    let cards = if buckets.is_empty() {
        empty_state("No data for statistics")
    } else {
        html! {
            <div class="grid grid-cols-1 md:grid-cols-3 gap-6">
                { for buckets.iter().map(|bucket| {
                    let share = share_percent(bucket.amount, total);
                    html! {
                        <div class="stat-card bg-card rounded-lg p-6 border border-border">
                            <h3 class="text-sm text-muted-foreground mb-2">{ bucket.category.clone() }</h3>
                            <div class="amount text-2xl font-bold text-[#1D617A]">{ format_money(bucket.amount, &state.currency) }</div>
                            <p class="text-xs text-muted-foreground mt-1">{ format!("{}% of total", share) }</p>
                        </div>
                    }
                }) }
            </div>
        }
    };

    html! {
        { page_shell(
            "Statistics",
            html! {},
            html! {
                <>
                    <div class="bg-card rounded-lg p-6 border border-border">
                        <p class="text-sm text-muted-foreground mb-2">{"Total spent"}</p>
                        <h3 class="text-3xl font-bold text-foreground">
                            { format!("{} {}", format_amount(total), currency_symbol_for(&state.currency)) }
                        </h3>
                        if let Some(date) = state.selected_date {
                            <p class="text-xs text-muted-foreground mt-1">{ format!("on {}", date.format("%d.%m.%Y")) }</p>
                        }
                    </div>
                    { cards }
                </>
            }
        ) }
    }
}

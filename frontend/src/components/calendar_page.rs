use chrono::{Local, NaiveDate};
use yew::prelude::*;

use super::icons::{icon_chevron_left, icon_chevron_right};
use super::{page_shell, Tracker};
use crate::format::format_money;
use crate::stats::DayCell;
use crate::view_state::ViewAction;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn heat_class(level: u8) -> &'static str {
    match level {
        0 => "bg-[#f1f4f9] text-slate-400",
        1 => "bg-[#D8E1E8] text-[#173E63]",
        2 => "bg-[#B2CBDE] text-[#173E63]",
        3 => "bg-[#1D617A] text-white",
        _ => "bg-[#173E63] text-white",
    }
}

#[derive(Properties, PartialEq)]
pub struct CalendarPageProps {
    /// Opens the expense list once a day has been picked.
    pub on_show_day: Callback<()>,
}

#[function_component(CalendarPage)]
pub fn calendar_page(props: &CalendarPageProps) -> Html {
    let tracker = use_context::<Tracker>();
    let Some(tracker) = tracker else {
        return html! {};
    };
    let state = &tracker.state;
    let month = state.calendar(&Local);
    let today = Local::now().date_naive();

    let on_prev = {
        let tracker = tracker.clone();
        Callback::from(move |_| tracker.dispatch(ViewAction::PrevMonth))
    };
    let on_next = {
        let tracker = tracker.clone();
        Callback::from(move |_| tracker.dispatch(ViewAction::NextMonth))
    };
    let on_pick = {
        let tracker = tracker.clone();
        Callback::from(move |date: NaiveDate| tracker.dispatch(ViewAction::SelectDate(date)))
    };

    let day_cell = |cell: &DayCell| {
        let selected = state.selected_date == Some(cell.date);
        let on_pick = on_pick.clone();
        let date = cell.date;
        let mut class = classes!(
            "calendar-day",
            "h-16",
            "rounded-lg",
            "p-2",
            "text-left",
            "text-[11px]",
            heat_class(cell.level)
        );
        if selected {
            class.push("ring-2");
            class.push("ring-red-400");
        }
        if cell.date == today {
            class.push("font-black");
        }
        html! {
            <button type="button" class={class} onclick={Callback::from(move |_| on_pick.emit(date))}
                title={format_money(cell.total, &state.currency)}>
                <span class="block">{ cell.date.format("%d").to_string() }</span>
                if cell.level > 0 {
                    <span class="block truncate">{ format_money(cell.total, &state.currency) }</span>
                }
            </button>
        }
    };

    let selected_summary = state.selected_date.map(|date| {
        let total = state.day_total(date, &Local);
        let on_show_day = props.on_show_day.clone();
        html! {
            <div class="flex items-center justify-between bg-card rounded-lg p-4 border border-border">
                <span class="text-sm text-foreground">
                    { format!("{}: {}", date.format("%d.%m.%Y"), format_money(total, &state.currency)) }
                </span>
                <button type="button" class="text-primary text-sm font-semibold"
                    onclick={Callback::from(move |_| on_show_day.emit(()))}>
                    {"Show expenses"}
                </button>
            </div>
        }
    });

    html! {
        { page_shell(
            "Calendar",
            html! {
                <div class="flex items-center gap-3 text-[#173E63]">
                    <button type="button" onclick={on_prev}>{ icon_chevron_left() }</button>
                    <span class="font-bold w-40 text-center">{ month.cursor.label() }</span>
                    <button type="button" onclick={on_next}>{ icon_chevron_right() }</button>
                </div>
            },
            html! {
                <>
                    <div class="grid grid-cols-7 gap-2 bg-card rounded-lg p-4 border border-border">
                        { for WEEKDAYS.iter().map(|day| html! {
                            <div class="text-center text-[10px] font-bold uppercase text-muted-foreground">{ *day }</div>
                        }) }
                        { for (0..month.leading_blanks).map(|_| html! { <div></div> }) }
                        { for month.days.iter().map(day_cell) }
                    </div>
                    { selected_summary.unwrap_or_default() }
                </>
            }
        ) }
    }
}

use yew::prelude::*;

use super::icons::*;
use crate::currency::currency_symbol_for;

#[derive(Clone, Copy, PartialEq)]
pub enum Page {
    Expenses,
    Statistics,
    Calendar,
    Categories,
    Settings,
}

struct NavItem {
    label: &'static str,
    page: Page,
    icon: fn() -> Html,
}

const NAV_ITEMS: [NavItem; 5] = [
    NavItem { label: "Expenses", page: Page::Expenses, icon: icon_list },
    NavItem { label: "Statistics", page: Page::Statistics, icon: icon_bar_chart },
    NavItem { label: "Calendar", page: Page::Calendar, icon: icon_calendar },
    NavItem { label: "Categories", page: Page::Categories, icon: icon_tag },
    NavItem { label: "Settings", page: Page::Settings, icon: icon_settings },
];

#[derive(Properties, PartialEq)]
pub struct LayoutProps {
    pub children: Children,
    pub active_page: Page,
    pub on_select: Callback<Page>,
    pub on_sign_out: Callback<()>,
    pub email: String,
    pub currency: String,
}

#[function_component(Layout)]
pub fn layout(props: &LayoutProps) -> Html {
    html! {
        <div class="flex h-screen bg-background">
            <div class="hidden md:flex">
                <Sidebar
                    active_page={props.active_page}
                    on_select={props.on_select.clone()}
                    on_sign_out={props.on_sign_out.clone()}
                />
            </div>

            <div class="flex-1 flex flex-col overflow-hidden">
                <Header email={props.email.clone()} currency={props.currency.clone()} />
                <main class="flex-1 overflow-y-auto">
                    { for props.children.iter() }
                </main>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct HeaderProps {
    email: String,
    currency: String,
}

#[function_component(Header)]
fn header(props: &HeaderProps) -> Html {
    html! {
        <header class="bg-[#D8E1E8] border-b border-border h-16 flex items-center justify-between px-6">
            <div class="flex-1"></div>
            <div class="flex items-center gap-4 text-sm text-[#173E63]">
                <span class="font-bold">
                    { format!("{} {}", currency_symbol_for(&props.currency), props.currency) }
                </span>
                <span class="text-slate-500">{ props.email.clone() }</span>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
struct SidebarProps {
    active_page: Page,
    on_select: Callback<Page>,
    on_sign_out: Callback<()>,
}

#[function_component(Sidebar)]
fn sidebar(props: &SidebarProps) -> Html {
    let on_sign_out = {
        let on_sign_out = props.on_sign_out.clone();
        Callback::from(move |_| on_sign_out.emit(()))
    };

    html! {
        <div class="w-[220px] h-screen bg-[#D8E1E8] p-4 flex flex-col">
            <div class="flex items-center gap-3 px-2 mb-8">
                <span class="text-[#173E63] text-2xl font-black tracking-tight">{"Expenses"}</span>
            </div>

            <div class="flex-1 bg-[#173E63] rounded-[24px] flex flex-col py-6 px-3 shadow-lg">
                <nav class="flex-1 space-y-2">
                    { for NAV_ITEMS.iter().map(|item| {
                        let is_active = item.page == props.active_page;
                        let class_name = if is_active {
                            "flex items-center gap-3 px-4 py-3 rounded-xl transition-all text-[13px] font-medium bg-[#B2CBDE] text-[#173E63] w-full"
                        } else {
                            "flex items-center gap-3 px-4 py-3 rounded-xl transition-all text-[13px] font-medium text-slate-300 hover:bg-white/5 hover:text-white w-full"
                        };
                        let on_select = props.on_select.clone();
                        let page = item.page;

                        html! {
                            <button type="button" class={class_name} onclick={Callback::from(move |_| on_select.emit(page))}>
                                <span class="shrink-0">{ (item.icon)() }</span>
                                <span class="truncate whitespace-nowrap text-left">{ item.label }</span>
                            </button>
                        }
                    }) }
                </nav>

                <div class="mt-auto pt-4">
                    <button onclick={on_sign_out} class="flex items-center gap-3 w-full px-4 py-3 rounded-xl hover:bg-white/10 transition-colors text-[13px] font-medium text-slate-300">
                        { icon_log_out() }
                        <span>{"Log Out"}</span>
                    </button>
                </div>
            </div>
        </div>
    }
}

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::icons::{icon_plus, icon_trash};
use super::{page_shell, Tracker};
use crate::api::categories;
use crate::browser;
use crate::config::FALLBACK_CATEGORY;
use crate::model::{validate_category_name, Category};
use crate::view_state::ViewAction;

#[function_component(CategoriesPage)]
pub fn categories_page() -> Html {
    let tracker = use_context::<Tracker>();
    let Some(tracker) = tracker else {
        return html! {};
    };

    html! {
        { page_shell(
            "Categories",
            html! {},
            html! {
                <>
                    <AddCategoryForm tracker={tracker.clone()} />
                    <div class="bg-card rounded-2xl shadow-md border border-border divide-y divide-border">
                        { for tracker.state.categories.iter().map(|category| html! {
                            <CategoryRow key={category.id} tracker={tracker.clone()} category={category.clone()} />
                        }) }
                    </div>
                </>
            }
        ) }
    }
}

#[derive(Properties, PartialEq)]
struct AddCategoryFormProps {
    tracker: Tracker,
}

#[function_component(AddCategoryForm)]
fn add_category_form(props: &AddCategoryFormProps) -> Html {
    let name = use_state(|| "".to_string());
    let error = use_state(|| None::<String>);

    let on_submit = {
        let tracker = props.tracker.clone();
        let name = name.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let valid = match validate_category_name(&name, &tracker.state.categories, None) {
                Ok(valid) => valid,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };
            error.set(None);
            let tracker = tracker.clone();
            let name = name.clone();
            spawn_local(async move {
                match categories::insert(&tracker.backend, &valid).await {
                    Ok(created) => {
                        tracker.dispatch(ViewAction::CategoryAdded(created));
                        name.set("".to_string());
                    }
                    Err(err) => tracker.fail("Could not create the category", err),
                }
            });
        })
    };

    let on_input = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    html! {
        <form onsubmit={on_submit} class="bg-white p-5 rounded-[10px] shadow-sm border border-white/50">
            <div class="flex gap-3">
                <input type="text" placeholder="New category" value={(*name).clone()} oninput={on_input}
                    class="flex-1 bg-[#f1f4f9] rounded-[10px] px-3 py-2 text-[12px] text-[#173E63] border-none" />
                <button type="submit" class="bg-[#173E63] text-white px-4 py-2 rounded-[10px] text-[11px] font-bold flex items-center gap-2">
                    { icon_plus() }{"Add"}
                </button>
            </div>
            if let Some(msg) = &*error {
                <p class="text-sm text-red-500 mt-3">{ msg.clone() }</p>
            }
        </form>
    }
}

#[derive(Properties, PartialEq)]
struct CategoryRowProps {
    tracker: Tracker,
    category: Category,
}

#[function_component(CategoryRow)]
fn category_row(props: &CategoryRowProps) -> Html {
    let draft = use_state(|| props.category.name.clone());
    let editing = use_state(|| false);
    let busy = use_state(|| false);

    let on_rename = {
        let tracker = props.tracker.clone();
        let category = props.category.clone();
        let draft = draft.clone();
        let editing = editing.clone();
        let busy = busy.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *draft == category.name {
                editing.set(false);
                return;
            }
            let new_name =
                match validate_category_name(&draft, &tracker.state.categories, Some(&category.name)) {
                    Ok(new_name) => new_name,
                    Err(err) => {
                        browser::alert(&err.to_string());
                        return;
                    }
                };
            busy.set(true);
            let tracker = tracker.clone();
            let category = category.clone();
            let editing = editing.clone();
            let busy = busy.clone();
            spawn_local(async move {
                match categories::rename(&tracker.backend, &category, &new_name).await {
                    Ok(()) => {
                        tracker.dispatch(ViewAction::CategoryRenamed {
                            from: category.name.clone(),
                            to: new_name,
                        });
                        editing.set(false);
                    }
                    Err(err) => tracker.fail("Could not rename the category", err),
                }
                busy.set(false);
            });
        })
    };

    let on_delete = {
        let tracker = props.tracker.clone();
        let category = props.category.clone();
        let busy = busy.clone();
        Callback::from(move |_| {
            let question = format!(
                "Delete \"{}\"? Its expenses move to \"{}\".",
                category.name, FALLBACK_CATEGORY
            );
            if !browser::confirm(&question) {
                return;
            }
            busy.set(true);
            let tracker = tracker.clone();
            let category = category.clone();
            let busy = busy.clone();
            spawn_local(async move {
                match categories::delete(&tracker.backend, &category).await {
                    Ok(()) => tracker.dispatch(ViewAction::CategoryDeleted { name: category.name }),
                    Err(err) => tracker.fail("Could not delete the category", err),
                }
                busy.set(false);
            });
        })
    };

    let on_edit = {
        let editing = editing.clone();
        let draft = draft.clone();
        let name = props.category.name.clone();
        Callback::from(move |_| {
            draft.set(name.clone());
            editing.set(true);
        })
    };

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            draft.set(input.value());
        })
    };

    let locked = props.category.is_fallback();

    html! {
        <div class="flex items-center gap-3 px-6 py-3">
            if *editing {
                <form onsubmit={on_rename} class="flex-1 flex gap-2">
                    <input type="text" value={(*draft).clone()} oninput={on_input}
                        class="flex-1 bg-[#f1f4f9] rounded-[10px] px-3 py-1 text-[12px] text-[#173E63] border-none" />
                    <button type="submit" class="text-primary text-sm font-semibold" disabled={*busy}>{"Save"}</button>
                </form>
            } else {
                <span class="flex-1 text-sm text-foreground">{ props.category.name.clone() }</span>
                if !locked {
                    <button type="button" class="text-sm text-muted-foreground" onclick={on_edit}>{"Rename"}</button>
                }
            }
            if !locked {
                <button type="button" class="btn btn-danger" onclick={on_delete} disabled={*busy}>{ icon_trash() }</button>
            }
        </div>
    }
}

use gloo_net::http::Request;
use serde_json::json;

use super::{decode, expenses, send, Backend, Query};
use crate::config::{DEFAULT_CATEGORIES, FALLBACK_CATEGORY};
use crate::error::AppError;
use crate::model::{Category, NewCategory};

const TABLE: &str = "categories";

pub async fn list(backend: &Backend) -> Result<Vec<Category>, AppError> {
    let query = Query::table(TABLE)
        .select("*")
        .eq("user_id", backend.user_id())
        .order("name", true);
    let response = backend.rest(Request::get, &query).send().await?;
    decode(response).await
}

async fn insert_many(backend: &Backend, names: &[&str]) -> Result<Vec<Category>, AppError> {
    let rows = names
        .iter()
        .map(|name| NewCategory { user_id: backend.user_id().to_string(), name: name.to_string() })
        .collect::<Vec<_>>();
    let query = Query::table(TABLE).select("*");
    let request = Backend::returning(backend.rest(Request::post, &query)).json(&rows)?;
    decode(request.send().await?).await
}

pub async fn insert(backend: &Backend, name: &str) -> Result<Category, AppError> {
    let mut rows = insert_many(backend, &[name]).await?;
    log::info!("created category {:?}", name);
    rows.pop()
        .ok_or_else(|| AppError::validation("Backend did not return the new category."))
}

/// Lists the user's categories, seeding the default set on first login and
/// restoring the fallback category if it is missing.
pub async fn ensure_defaults(backend: &Backend) -> Result<Vec<Category>, AppError> {
    let mut categories = list(backend).await?;
    if categories.is_empty() {
        log::info!("seeding default categories for {}", backend.user_id());
        categories = insert_many(backend, &DEFAULT_CATEGORIES).await?;
    } else if !categories.iter().any(Category::is_fallback) {
        categories.extend(insert_many(backend, &[FALLBACK_CATEGORY]).await?);
    }
    Ok(categories)
}

/// Renames the category row, then every expense that carried the old name.
pub async fn rename(backend: &Backend, category: &Category, new_name: &str) -> Result<(), AppError> {
    let query = Query::table(TABLE)
        .eq("id", category.id)
        .eq("user_id", backend.user_id());
    let request = backend
        .rest(Request::patch, &query)
        .json(&json!({ "name": new_name }))?;
    send(request).await?;
    expenses::relabel(backend, &category.name, new_name).await
}

/// Moves the category's expenses to the fallback category, then deletes it.
pub async fn delete(backend: &Backend, category: &Category) -> Result<(), AppError> {
    if category.is_fallback() {
        return Err(AppError::validation(format!(
            "\"{FALLBACK_CATEGORY}\" cannot be deleted."
        )));
    }
    expenses::relabel(backend, &category.name, FALLBACK_CATEGORY).await?;
    let query = Query::table(TABLE)
        .eq("id", category.id)
        .eq("user_id", backend.user_id());
    let response = backend.rest(Request::delete, &query).send().await?;
    super::check(response).await?;
    log::info!("deleted category {:?}", category.name);
    Ok(())
}

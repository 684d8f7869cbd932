use gloo_net::http::Request;

use super::{decode, Backend, Query};
use crate::error::AppError;
use crate::model::UserSettings;

const TABLE: &str = "user_settings";

pub async fn load(backend: &Backend) -> Result<Option<UserSettings>, AppError> {
    let query = Query::table(TABLE).select("*").eq("user_id", backend.user_id());
    let response = backend.rest(Request::get, &query).send().await?;
    let mut rows: Vec<UserSettings> = decode(response).await?;
    Ok(rows.pop())
}

/// Creates or replaces the user's settings row.
pub async fn save(backend: &Backend, currency: &str) -> Result<UserSettings, AppError> {
    let row = UserSettings {
        user_id: backend.user_id().to_string(),
        default_currency: currency.to_string(),
    };
    let query = Query::table(TABLE).select("*").on_conflict("user_id");
    let request = backend
        .rest(Request::post, &query)
        .header("Prefer", "resolution=merge-duplicates,return=representation")
        .json(&[&row])?;
    let mut rows: Vec<UserSettings> = decode(request.send().await?).await?;
    log::info!("default currency set to {}", currency);
    Ok(rows.pop().unwrap_or(row))
}

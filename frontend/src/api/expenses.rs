use gloo_net::http::Request;
use serde_json::json;

use super::{decode, send, Backend, Query};
use crate::error::AppError;
use crate::model::{Expense, ExpenseId, NewExpense};

const TABLE: &str = "expenses";

pub async fn list(backend: &Backend) -> Result<Vec<Expense>, AppError> {
    let query = Query::table(TABLE)
        .select("*")
        .eq("user_id", backend.user_id())
        .order("created_at", false);
    let response = backend.rest(Request::get, &query).send().await?;
    decode(response).await
}

pub async fn insert(backend: &Backend, expense: &NewExpense) -> Result<Expense, AppError> {
    let query = Query::table(TABLE).select("*");
    let request = Backend::returning(backend.rest(Request::post, &query)).json(&[expense])?;
    let mut rows: Vec<Expense> = decode(request.send().await?).await?;
    let created = rows
        .pop()
        .ok_or_else(|| AppError::validation("Backend did not return the new expense."))?;
    log::info!("added expense {} ({} {})", created.id, created.amount, created.currency);
    Ok(created)
}

pub async fn delete(backend: &Backend, id: ExpenseId) -> Result<(), AppError> {
    let query = Query::table(TABLE).eq("id", id).eq("user_id", backend.user_id());
    let response = backend.rest(Request::delete, &query).send().await?;
    super::check(response).await?;
    log::info!("deleted expense {}", id);
    Ok(())
}

/// Moves every expense of category `from` to category `to`.
pub async fn relabel(backend: &Backend, from: &str, to: &str) -> Result<(), AppError> {
    let query = Query::table(TABLE)
        .eq("user_id", backend.user_id())
        .eq("category", from);
    let request = backend
        .rest(Request::patch, &query)
        .json(&json!({ "category": to }))?;
    send(request).await?;
    log::info!("moved expenses from category {:?} to {:?}", from, to);
    Ok(())
}

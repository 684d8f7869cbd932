//! Gateway to the hosted backend (PostgREST tables and GoTrue auth) and to
//! the public exchange-rate service.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::currency::RateTable;
use crate::error::AppError;
use crate::model::{Category, Expense, Session};

pub mod auth;
pub mod categories;
pub mod expenses;
pub mod query;
pub mod rates;
pub mod settings;

use query::Query;

/// An authenticated handle on the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Backend {
    pub config: AppConfig,
    pub session: Session,
}

impl Backend {
    pub fn new(config: AppConfig, session: Session) -> Self {
        Backend { config, session }
    }

    pub fn user_id(&self) -> &str {
        &self.session.user.id
    }

    fn rest(&self, verb: fn(&str) -> RequestBuilder, query: &Query) -> RequestBuilder {
        let url = self.config.rest_url(query.table_name());
        log::debug!("{} {:?}", url, query.params().collect::<Vec<_>>());
        self.authorize(verb(&url).query(query.params()))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.supabase_anon_key)
            .header("Authorization", &format!("Bearer {}", self.session.access_token))
    }

    /// Sends a request whose response rows are wanted back.
    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }
}

/// Fails with the parsed backend message on non-2xx responses.
async fn check(response: Response) -> Result<Response, AppError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::from_response(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let body = check(response).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

async fn send(request: Request) -> Result<Response, AppError> {
    check(request.send().await?).await
}

/// The data every page needs after sign-in.
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub categories: Vec<Category>,
    pub currency: String,
    pub rates: RateTable,
    pub expenses: Vec<Expense>,
}

/// Page-load sequence: categories (seeded on first login), the display
/// currency, its rate table, then the expenses themselves.
pub async fn load_dashboard(backend: &Backend) -> Result<Dashboard, AppError> {
    let categories = categories::ensure_defaults(backend).await?;
    let currency = settings::load(backend)
        .await?
        .map(|s| s.default_currency)
        .unwrap_or_else(|| crate::config::DEFAULT_CURRENCY.to_string());
    let rates = rates::fetch_or_identity(&backend.config, &currency).await;
    let expenses = expenses::list(backend).await?;
    log::info!(
        "loaded {} expenses in {} categories, currency {}",
        expenses.len(),
        categories.len(),
        currency
    );
    Ok(Dashboard { categories, currency, rates, expenses })
}

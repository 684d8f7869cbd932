use gloo_net::http::Request;

use super::check;
use crate::config::AppConfig;
use crate::currency::RateTable;
use crate::error::AppError;

/// Rates of all currencies relative to `base`.
pub async fn fetch(config: &AppConfig, base: &str) -> Result<RateTable, AppError> {
    log::debug!("fetching rates for {} from {}", base, config.rates_url);
    let response = Request::get(&config.rates_url)
        .query([("base", base)])
        .send()
        .await?;
    let body = check(response).await?.text().await?;
    RateTable::from_response(base, &body)
}

pub async fn fetch_or_identity(config: &AppConfig, base: &str) -> RateTable {
    match fetch(config, base).await {
        Ok(rates) => rates,
        Err(err) => {
            log::warn!("exchange rates unavailable ({}), using 1:1 rates", err);
            RateTable::identity(base)
        }
    }
}

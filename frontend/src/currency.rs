use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

pub const SUPPORTED_CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "RUB", "JPY", "CNY"];

pub fn currency_symbol_for(code: &str) -> &'static str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "RUB" => "₽",
        "JPY" | "CNY" => "¥",
        _ => "¤",
    }
}

/// Upper-cases a 3-letter alphabetic currency code, `None` for anything else.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| code.to_ascii_uppercase())
}

/// Rates of every known currency relative to `base`, i.e. how many units of
/// the currency one unit of `base` buys.
#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, Decimal>,
}

#[derive(Deserialize)]
struct RatesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Every supported currency at rate 1. Used when the rate service cannot
    /// be reached.
    pub fn identity(base: &str) -> Self {
        let mut rates: HashMap<String, Decimal> = SUPPORTED_CURRENCIES
            .iter()
            .map(|code| (code.to_string(), Decimal::ONE))
            .collect();
        rates.insert(base.to_string(), Decimal::ONE);
        RateTable { base: base.to_string(), rates }
    }

    pub fn from_response(base: &str, body: &str) -> Result<Self, AppError> {
        let parsed: RatesResponse = serde_json::from_str(body)?;
        if !parsed.success || parsed.rates.is_empty() {
            return Err(AppError::RatesUnavailable);
        }
        Ok(RateTable { base: base.to_string(), rates: parsed.rates })
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }
}

/// Converts `amount` from `from` into `to`.
///
/// The table is assumed to be anchored to `to`, so the amount is divided by
/// the rate of `from`. Missing or zero rates leave the amount as it is.
pub fn convert(amount: Decimal, from: &str, to: &str, rates: &RateTable) -> Decimal {
    if from == to {
        return amount;
    }
    match rates.rate(from) {
        Some(rate) if !rate.is_zero() => amount.checked_div(rate).unwrap_or(amount),
        _ => amount,
    }
}

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::currency::currency_symbol_for;

fn format_with_commas(digits: &str) -> String {
    let s = digits.chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

/// `1234.5` in USD renders as `$ 1,234.50`.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!(
        "{}{} {}.{}",
        sign,
        currency_symbol_for(currency),
        format_with_commas(whole),
        cents
    )
}

/// Plain two-decimal amount without symbol, used for the grand total.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%d.%m.%Y %H:%M").to_string()
}

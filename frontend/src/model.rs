use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{FALLBACK_CATEGORY, MAX_EXPENSE_AMOUNT};
use crate::currency;
use crate::error::AppError;

pub type ExpenseId = i64;
pub type CategoryId = i64;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.created_at.with_timezone(tz).date_naive()
    }
}

/// Insert payload for the `expenses` table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewExpense {
    pub user_id: String,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Raw values of the add-expense form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub currency: String,
    /// `YYYY-MM-DD` as produced by a date input, or empty for "now".
    pub date: String,
}

impl ExpenseForm {
    pub fn validate<Tz: TimeZone>(
        &self,
        user_id: &str,
        now: DateTime<Tz>,
    ) -> Result<NewExpense, AppError> {
        let amount = parse_amount(&self.amount)?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(AppError::validation("Choose a category."));
        }

        let currency = currency::normalize_code(&self.currency)
            .ok_or_else(|| AppError::validation("Currency must be a 3-letter code."))?;

        let created_at = match self.date.trim() {
            "" => now.with_timezone(&Utc),
            raw => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| AppError::validation("Date must look like YYYY-MM-DD."))?;
                let tz = now.timezone();
                tz.from_local_datetime(&date.and_time(now.time()))
                    .earliest()
                    .ok_or_else(|| AppError::validation("Date does not exist in local time."))?
                    .with_timezone(&Utc)
            }
        };

        Ok(NewExpense {
            user_id: user_id.to_string(),
            amount,
            category: category.to_string(),
            description: self.description.trim().to_string(),
            currency,
            created_at,
        })
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(AppError::validation("Enter an amount."));
    }
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| AppError::validation("Amount must be a number."))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be a positive number."));
    }
    let amount = amount.round_dp(2);
    if amount >= Decimal::from(MAX_EXPENSE_AMOUNT) {
        return Err(AppError::validation(format!(
            "Amount must be below {MAX_EXPENSE_AMOUNT}."
        )));
    }
    Ok(amount)
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: String,
    pub name: String,
}

impl Category {
    pub fn is_fallback(&self) -> bool {
        self.name == FALLBACK_CATEGORY
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewCategory {
    pub user_id: String,
    pub name: String,
}

/// Checks a new or renamed category name against the user's categories.
/// `renaming` is the current name when the name of an existing category is
/// being changed.
pub fn validate_category_name(
    raw: &str,
    existing: &[Category],
    renaming: Option<&str>,
) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Category name cannot be empty."));
    }
    if renaming == Some(FALLBACK_CATEGORY) {
        return Err(AppError::validation(format!(
            "\"{FALLBACK_CATEGORY}\" cannot be renamed."
        )));
    }
    let taken = existing
        .iter()
        .filter(|c| Some(c.name.as_str()) != renaming)
        .any(|c| c.name.eq_ignore_ascii_case(name));
    if taken {
        return Err(AppError::validation(format!("Category \"{name}\" already exists.")));
    }
    Ok(name.to_string())
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserSettings {
    pub user_id: String,
    pub default_currency: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

#[cfg(test)]
mod test {
    use chrono::{FixedOffset, Timelike};

    use super::*;

    fn form(amount: &str, category: &str) -> ExpenseForm {
        ExpenseForm {
            amount: amount.to_string(),
            category: category.to_string(),
            description: "  lunch ".to_string(),
            currency: "usd".to_string(),
            date: String::new(),
        }
    }

    fn category(id: CategoryId, name: &str) -> Category {
        Category { id, user_id: "u1".to_string(), name: name.to_string() }
    }

    #[test]
    fn valid_form_becomes_insert_payload() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 0).unwrap();
        let new = form("12,5", "Food").validate("u1", now).unwrap();
        assert_eq!(new.amount, Decimal::new(1250, 2));
        assert_eq!(new.currency, "USD");
        assert_eq!(new.description, "lunch");
        assert_eq!(new.created_at, now);
        assert_eq!(new.user_id, "u1");
    }

    #[test]
    fn rejects_bad_amounts() {
        let now = Utc::now();
        for amount in ["", "abc", "0", "-3"] {
            let err = form(amount, "Food").validate("u1", now).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{amount}");
        }
    }

    #[test]
    fn rejects_amounts_past_the_limit() {
        let now = Utc::now();
        for amount in ["30000000000000000000000000000", "1000000000000", "999999999999.999"] {
            let err = form(amount, "Food").validate("u1", now).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{amount}");
        }
        let new = form("999999999999.99", "Food").validate("u1", now).unwrap();
        assert_eq!(new.amount, Decimal::new(99_999_999_999_999, 2));
    }

    #[test]
    fn rejects_missing_category_and_bad_currency() {
        let now = Utc::now();
        assert!(form("5", " ").validate("u1", now).is_err());

        let mut f = form("5", "Food");
        f.currency = "dollars".to_string();
        assert!(f.validate("u1", now).is_err());
    }

    #[test]
    fn explicit_date_keeps_local_time_of_day() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 10, 9, 15, 0).unwrap();
        let mut f = form("5", "Food");
        f.date = "2024-02-29".to_string();
        let new = f.validate("u1", now).unwrap();
        let local = new.created_at.with_timezone(&tz);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!((local.hour(), local.minute()), (9, 15));

        f.date = "29.02.2024".to_string();
        assert!(f.validate("u1", now).is_err());
    }

    #[test]
    fn category_names_are_unique_and_trimmed() {
        let existing = vec![category(1, "Food"), category(2, "Other")];
        assert_eq!(validate_category_name("  Travel ", &existing, None).unwrap(), "Travel");
        assert!(validate_category_name("food", &existing, None).is_err());
        assert!(validate_category_name("", &existing, None).is_err());
        // renaming to a different casing of itself is fine
        assert_eq!(validate_category_name("FOOD", &existing, Some("Food")).unwrap(), "FOOD");
        assert!(validate_category_name("Misc", &existing, Some("Other")).is_err());
    }

    #[test]
    fn decodes_backend_rows() {
        let raw = r#"[{"id":7,"user_id":"u1","amount":100.5,"category":"Food",
            "description":null,"currency":"EUR","created_at":"2024-01-05T10:00:00.123456+00:00"}]"#;
        let rows: Vec<Expense> = serde_json::from_str(raw).unwrap();
        assert_eq!(rows[0].amount, Decimal::new(1005, 1));
        assert_eq!(rows[0].description(), "");
        assert_eq!(rows[0].local_date(&Utc), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}

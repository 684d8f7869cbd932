//! Build-time configuration for the remote services.

const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";
const DEFAULT_SUPABASE_ANON_KEY: &str = "";
const DEFAULT_RATES_URL: &str = "https://api.exchangerate.host/latest";

/// Currency shown to a user who has never picked one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Categories created for a user on first login.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Housing",
    "Entertainment",
    "Health",
    "Shopping",
    FALLBACK_CATEGORY,
];

/// Expenses of a deleted category are moved here. Cannot be renamed or deleted.
pub const FALLBACK_CATEGORY: &str = "Other";

pub const SESSION_STORAGE_KEY: &str = "expense_tracker_session";

pub const MIN_PASSWORD_LEN: usize = 6;

/// Largest amount a single expense may carry, in whole currency units.
pub const MAX_EXPENSE_AMOUNT: i64 = 1_000_000_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub rates_url: String,
}

impl AppConfig {
    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `EXCHANGE_RATES_URL` as
    /// they were set when the bundle was compiled.
    pub fn from_build_env() -> Self {
        Self::from_parts(
            option_env!("SUPABASE_URL"),
            option_env!("SUPABASE_ANON_KEY"),
            option_env!("EXCHANGE_RATES_URL"),
        )
    }

    fn from_parts(url: Option<&str>, key: Option<&str>, rates: Option<&str>) -> Self {
        let pick = |value: Option<&str>, default: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .trim_end_matches('/')
                .to_string()
        };
        AppConfig {
            supabase_url: pick(url, DEFAULT_SUPABASE_URL),
            supabase_anon_key: pick(key, DEFAULT_SUPABASE_ANON_KEY),
            rates_url: pick(rates, DEFAULT_RATES_URL),
        }
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, table)
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url, endpoint)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let config = AppConfig::from_parts(None, Some("  "), None);
        assert_eq!(config.supabase_url, DEFAULT_SUPABASE_URL);
        assert_eq!(config.supabase_anon_key, "");
        assert_eq!(config.rates_url, DEFAULT_RATES_URL);
    }

    #[test]
    fn builds_service_urls() {
        let config = AppConfig::from_parts(Some("https://abc.supabase.co/"), Some("key"), None);
        assert_eq!(config.rest_url("expenses"), "https://abc.supabase.co/rest/v1/expenses");
        assert_eq!(
            config.auth_url("token?grant_type=password"),
            "https://abc.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn fallback_category_is_seeded() {
        assert!(DEFAULT_CATEGORIES.contains(&FALLBACK_CATEGORY));
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(#[from] gloo_net::Error),
    #[error("backend rejected the request ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("session expired, please sign in again")]
    Unauthorized,
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("exchange rate service reported a failure")]
    RatesUnavailable,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return AppError::Unauthorized;
        }
        AppError::Backend {
            status,
            message: extract_message(body).unwrap_or_else(|| "request failed".to_string()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

/// Supabase answers with one of several error shapes depending on the
/// service: `error_description` / `msg` from auth, `message` from PostgREST.
fn extract_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok();
    if let Some(json) = json {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                if !msg.is_empty() {
                    return Some(msg.to_string());
                }
            }
        }
        return None;
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unauthorized_status_is_classified() {
        assert!(AppError::from_response(401, "{}").is_unauthorized());
    }

    #[test]
    fn picks_auth_error_description() {
        let err = AppError::from_response(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(
            err.to_string(),
            "backend rejected the request (400): Invalid login credentials"
        );
    }

    #[test]
    fn picks_postgrest_message() {
        let err = AppError::from_response(
            409,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        );
        match err {
            AppError::Backend { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key value violates unique constraint");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_text_and_empty_bodies() {
        match AppError::from_response(500, "Internal Server Error") {
            AppError::Backend { message, .. } => assert_eq!(message, "Internal Server Error"),
            other => panic!("unexpected {other:?}"),
        }
        match AppError::from_response(502, "") {
            AppError::Backend { message, .. } => assert_eq!(message, "request failed"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

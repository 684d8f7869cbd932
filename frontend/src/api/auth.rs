use gloo_net::http::Request;
use serde_json::json;

use super::{check, decode};
use crate::config::{AppConfig, MIN_PASSWORD_LEN};
use crate::error::AppError;
use crate::model::{Session, User};

#[derive(Clone, Debug, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The project requires e-mail confirmation before the first sign-in.
    ConfirmationRequired,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Form rules shared by sign-in and sign-up. `confirm` is the repeated
    /// password on the sign-up form.
    pub fn validate(email: &str, password: &str, confirm: Option<&str>) -> Result<Self, AppError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        if !email.contains('@') {
            return Err(AppError::validation("Enter a valid email address"));
        }
        if let Some(confirm) = confirm {
            if password != confirm {
                return Err(AppError::validation("Passwords do not match"));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AppError::validation(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
        }
        Ok(Credentials { email: email.to_string(), password: password.to_string() })
    }

    fn body(&self) -> serde_json::Value {
        json!({ "email": self.email, "password": self.password })
    }
}

pub async fn sign_in(config: &AppConfig, credentials: &Credentials) -> Result<Session, AppError> {
    let url = config.auth_url("token");
    let request = Request::post(&url)
        .query([("grant_type", "password")])
        .header("apikey", &config.supabase_anon_key)
        .json(&credentials.body())?;
    let session: Session = decode(request.send().await?).await?;
    log::info!("signed in as {}", session.user.id);
    Ok(session)
}

pub async fn sign_up(config: &AppConfig, credentials: &Credentials) -> Result<SignUpOutcome, AppError> {
    let url = config.auth_url("signup");
    let request = Request::post(&url)
        .header("apikey", &config.supabase_anon_key)
        .json(&credentials.body())?;
    let body = check(request.send().await?).await?.text().await?;
    parse_sign_up(&body)
}

fn parse_sign_up(body: &str) -> Result<SignUpOutcome, AppError> {
    if let Ok(session) = serde_json::from_str::<Session>(body) {
        log::info!("registered and signed in as {}", session.user.id);
        return Ok(SignUpOutcome::SignedIn(session));
    }
    let user: User = serde_json::from_str(body)?;
    log::info!("registered {}, awaiting confirmation", user.id);
    Ok(SignUpOutcome::ConfirmationRequired)
}

/// Trades the session's refresh token for a fresh access token. A missing or
/// rejected refresh token ends the session.
pub async fn refresh(config: &AppConfig, session: &Session) -> Result<Session, AppError> {
    let url = config.auth_url("token");
    let request = Request::post(&url)
        .query([("grant_type", "refresh_token")])
        .header("apikey", &config.supabase_anon_key)
        .json(&refresh_body(session)?)?;
    let renewed: Session = decode(request.send().await?).await.map_err(refresh_rejected)?;
    log::info!("renewed session for {}", renewed.user.id);
    Ok(renewed)
}

fn refresh_body(session: &Session) -> Result<serde_json::Value, AppError> {
    match session.refresh_token.as_deref() {
        Some(token) if !token.is_empty() => Ok(json!({ "refresh_token": token })),
        _ => Err(AppError::Unauthorized),
    }
}

/// GoTrue answers a revoked or reused refresh token with a 4xx `invalid_grant`.
fn refresh_rejected(err: AppError) -> AppError {
    match err {
        AppError::Backend { status: 400..=499, .. } => AppError::Unauthorized,
        other => other,
    }
}

/// Revokes the session on the backend.
pub async fn sign_out(config: &AppConfig, session: &Session) -> Result<(), AppError> {
    let url = config.auth_url("logout");
    let response = Request::post(&url)
        .header("apikey", &config.supabase_anon_key)
        .header("Authorization", &format!("Bearer {}", session.access_token))
        .send()
        .await?;
    check(response).await?;
    log::info!("signed out {}", session.user.id);
    Ok(())
}

/// Checks that a restored session is still accepted.
pub async fn current_user(config: &AppConfig, session: &Session) -> Result<User, AppError> {
    let url = config.auth_url("user");
    let response = Request::get(&url)
        .header("apikey", &config.supabase_anon_key)
        .header("Authorization", &format!("Bearer {}", session.access_token))
        .send()
        .await?;
    decode(response).await
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sign_in_needs_email_and_password() {
        assert!(Credentials::validate("", "secret", None).is_err());
        assert!(Credentials::validate("a@b.c", "", None).is_err());
        assert!(Credentials::validate("not-an-email", "secret", None).is_err());
        let creds = Credentials::validate(" a@b.c ", "123", None).unwrap();
        assert_eq!(creds.email, "a@b.c");
    }

    #[test]
    fn sign_up_checks_confirmation_and_length() {
        let mismatch = Credentials::validate("a@b.c", "secret1", Some("secret2")).unwrap_err();
        assert_eq!(mismatch.to_string(), "Passwords do not match");
        let short = Credentials::validate("a@b.c", "12345", Some("12345")).unwrap_err();
        assert_eq!(short.to_string(), "Password must be at least 6 characters");
        assert!(Credentials::validate("a@b.c", "123456", Some("123456")).is_ok());
    }

    #[test]
    fn sign_up_with_immediate_session() {
        let body = r#"{"access_token":"tok","token_type":"bearer","expires_in":3600,
            "refresh_token":"ref","user":{"id":"u1","email":"a@b.c"}}"#;
        match parse_sign_up(body).unwrap() {
            SignUpOutcome::SignedIn(session) => {
                assert_eq!(session.access_token, "tok");
                assert_eq!(session.user.id, "u1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn refresh_needs_a_refresh_token() {
        let mut session: Session = serde_json::from_str(
            r#"{"access_token":"tok","refresh_token":"ref","user":{"id":"u1"}}"#,
        )
        .unwrap();
        assert_eq!(refresh_body(&session).unwrap(), json!({ "refresh_token": "ref" }));
        session.refresh_token = Some(String::new());
        assert!(refresh_body(&session).unwrap_err().is_unauthorized());
        session.refresh_token = None;
        assert!(refresh_body(&session).unwrap_err().is_unauthorized());
    }

    #[test]
    fn rejected_refresh_ends_the_session() {
        let invalid_grant = AppError::from_response(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        );
        assert!(refresh_rejected(invalid_grant).is_unauthorized());
        let outage = AppError::from_response(503, "upstream unavailable");
        assert!(!refresh_rejected(outage).is_unauthorized());
    }

    #[test]
    fn sign_up_pending_confirmation() {
        let body = r#"{"id":"u1","email":"a@b.c","confirmation_sent_at":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(parse_sign_up(body).unwrap(), SignUpOutcome::ConfirmationRequired);
        assert!(parse_sign_up("[]").is_err());
    }
}

//! Small wrappers over the browser window: local storage and dialogs.

use crate::config::SESSION_STORAGE_KEY;
use crate::error::AppError;
use crate::model::Session;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load_session() -> Option<Session> {
    let raw = local_storage()?.get_item(SESSION_STORAGE_KEY).ok().flatten()?;
    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            log::warn!("discarding unreadable stored session: {}", err);
            clear_session();
            None
        }
    }
}

pub fn save_session(session: &Session) {
    if let Some(storage) = local_storage() {
        if let Ok(raw) = serde_json::to_string(session) {
            let _ = storage.set_item(SESSION_STORAGE_KEY, &raw);
        }
    }
}

pub fn clear_session() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SESSION_STORAGE_KEY);
    }
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Logs a failed remote call and shows it to the user.
pub fn report(action: &str, err: &AppError) {
    log::error!("{}: {}", action, err);
    alert(&format!("{}. {}", action, err));
}

//! User-facing texts and the HTTP status lookup table.

pub const NETWORK_ERROR_MESSAGE: &str = "network error, please check your connection";
pub const REQUEST_EXCEPTION_MESSAGE: &str = "request exception, please try again later";
pub const OPERATION_FAILED_MESSAGE: &str = "operation failed";
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired, please re-login";

/// What the response interceptor does with a non-2xx HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    /// Run the confirm-then-redirect flow; no toast is shown.
    SessionExpired,
    Notify(String),
}

/// `None` marks the session-expired status.
const STATUS_TABLE: &[(u16, Option<&str>)] = &[
    (401, None),
    (403, Some("insufficient permission")),
    (404, Some("resource not found")),
    (500, Some("server internal error")),
];

pub fn action_for_status(status: u16) -> StatusAction {
    match STATUS_TABLE.iter().find(|(code, _)| *code == status) {
        Some((_, None)) => StatusAction::SessionExpired,
        Some((_, Some(text))) => StatusAction::Notify(text.to_string()),
        None => StatusAction::Notify(format!("request error: {status}")),
    }
}

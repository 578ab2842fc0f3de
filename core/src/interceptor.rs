//! Request and response interceptors.
//!
//! # Design
//! The request side validates the descriptor and decorates it with default
//! headers and the bearer token. The response side turns a raw transport
//! outcome into either a success envelope or a classified `ApiError`,
//! notifying the user on every failure path. Session expiry (HTTP 401 or
//! envelope code 401) additionally runs `SessionExpiryFlow`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::MULTIPART_CONTENT_TYPE;
use crate::envelope::{ResponseEnvelope, SESSION_EXPIRED_CODE};
use crate::error::{ApiError, TransportError};
use crate::feedback::{ConfirmPrompt, Navigator, Notifier, SessionDialog};
use crate::http::{HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::status::{
    action_for_status, StatusAction, NETWORK_ERROR_MESSAGE, OPERATION_FAILED_MESSAGE,
    SESSION_EXPIRED_MESSAGE,
};

/// Decorates outgoing requests.
pub struct RequestInterceptor {
    session: SessionStore,
    default_headers: Vec<(String, String)>,
}

impl RequestInterceptor {
    pub fn new(session: SessionStore, default_headers: Vec<(String, String)>) -> Self {
        Self {
            session,
            default_headers,
        }
    }

    pub fn intercept(&self, mut request: HttpRequest) -> Result<HttpRequest, ApiError> {
        validate(&request)?;

        if request.is_multipart() {
            request.insert_default_header("Content-Type", MULTIPART_CONTENT_TYPE);
        }
        for (name, value) in &self.default_headers {
            if request.is_multipart()
                && name.eq_ignore_ascii_case("content-type")
                && value.starts_with("application/json")
            {
                continue;
            }
            request.insert_default_header(name, value);
        }

        match self.session.token() {
            Ok(Some(token)) => request.set_header("Authorization", format!("Bearer {token}")),
            Ok(None) => debug!(path = %request.path, "no session token, sending anonymously"),
            Err(e) => warn!(error = %e, "session storage unreadable, sending anonymously"),
        }

        Ok(request)
    }
}

fn validate(request: &HttpRequest) -> Result<(), ApiError> {
    if !request.path.starts_with('/') {
        return Err(ApiError::InvalidRequest(format!(
            "path must start with '/': {:?}",
            request.path
        )));
    }
    if request.body.is_some() && !request.method.has_body() {
        return Err(ApiError::InvalidRequest(format!(
            "{} requests cannot carry a body",
            request.method.as_str()
        )));
    }
    Ok(())
}

/// Confirm-then-redirect handling of an expired session.
pub struct SessionExpiryFlow {
    session: SessionStore,
    dialog: Arc<dyn SessionDialog>,
    navigator: Arc<dyn Navigator>,
    pending: AtomicBool,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionExpiryFlow {
    pub fn new(
        session: SessionStore,
        dialog: Arc<dyn SessionDialog>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            dialog,
            navigator,
            pending: AtomicBool::new(false),
        }
    }

    /// Ask the user to log in again. On confirmation the token is erased
    /// and the router is sent to the login page. Returns whether that
    /// happened. Expiries arriving while a dialog is already open are
    /// folded into it.
    pub async fn run(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            debug!("session-expired dialog already open");
            return false;
        }
        let _pending = PendingGuard(&self.pending);

        if !self.dialog.confirm(&ConfirmPrompt::session_expired()).await {
            info!("session-expired dialog dismissed");
            return false;
        }

        if let Err(e) = self.session.clear() {
            warn!(error = %e, "failed to erase session token");
        }
        let return_path = self.navigator.current_path();
        self.navigator.redirect_to_login(return_path.as_deref());
        info!("session token erased, redirected to login");
        true
    }
}

/// Classifies settled requests.
pub struct ResponseInterceptor {
    notifier: Arc<dyn Notifier>,
    expiry: SessionExpiryFlow,
}

impl ResponseInterceptor {
    pub fn new(notifier: Arc<dyn Notifier>, expiry: SessionExpiryFlow) -> Self {
        Self { notifier, expiry }
    }

    pub async fn intercept(
        &self,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<ResponseEnvelope, ApiError> {
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "no response received");
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(ApiError::Transport(err));
            }
        };

        if !response.is_success() {
            return Err(self.http_failure(response).await);
        }

        let envelope = match ResponseEnvelope::parse(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(error = %err, "response body is not an envelope");
                self.notifier.error(OPERATION_FAILED_MESSAGE);
                return Err(err);
            }
        };

        if envelope.is_success() {
            return Ok(envelope);
        }

        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| OPERATION_FAILED_MESSAGE.to_string());
        warn!(code = envelope.code, %message, "application error");
        self.notifier.error(&message);

        if envelope.code == SESSION_EXPIRED_CODE {
            self.expiry.run().await;
            return Err(ApiError::SessionExpired { message });
        }
        Err(ApiError::Application {
            code: envelope.code,
            message,
        })
    }

    async fn http_failure(&self, response: HttpResponse) -> ApiError {
        warn!(status = response.status, "HTTP error status");
        match action_for_status(response.status) {
            StatusAction::SessionExpired => {
                self.expiry.run().await;
                ApiError::SessionExpired {
                    message: SESSION_EXPIRED_MESSAGE.to_string(),
                }
            }
            StatusAction::Notify(text) => {
                self.notifier.error(&text);
                ApiError::HttpStatus {
                    status: response.status,
                    body: response.body,
                }
            }
        }
    }
}

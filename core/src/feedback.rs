//! Capabilities the pipeline uses to talk to the user interface.
//!
//! The pipeline never renders anything itself. Notifications, the loading
//! overlay, the session-expired dialog and navigation are all injected at
//! construction time so a UI layer (or a test) can supply its own.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::session::login_location;

/// Transient user-visible notifications.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);

    fn success(&self, _message: &str) {}
}

/// The visual loading overlay. Reference counting lives in `LoadingTracker`;
/// implementations only flip visibility.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Text of a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmPrompt {
    pub fn session_expired() -> Self {
        Self {
            title: "Session expired".to_string(),
            message: "Your session has expired, please log in again".to_string(),
            confirm_label: "Log in again".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Modal confirmation. Resolves to `true` when the user confirms and
/// `false` when the dialog is dismissed.
#[async_trait]
pub trait SessionDialog: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Navigation handed over to the router outside the pipeline.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown, if known.
    fn current_path(&self) -> Option<String> {
        None
    }

    fn redirect_to_login(&self, return_path: Option<&str>);
}

/// Logs notifications instead of displaying them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(%message, "notification");
    }

    fn success(&self, message: &str) {
        info!(%message, "notification");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl LoadingIndicator for NoopIndicator {
    fn show(&self) {}
    fn hide(&self) {}
}

/// Answers every dialog with a fixed choice.
#[derive(Debug, Clone, Copy)]
pub struct FixedDialog(pub bool);

#[async_trait]
impl SessionDialog for FixedDialog {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        info!(title = %prompt.title, confirmed = self.0, "session dialog");
        self.0
    }
}

/// In-process router: keeps the navigation history and resolves login
/// redirects against a fixed login path.
#[derive(Debug)]
pub struct HistoryNavigator {
    login_path: String,
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, path: impl Into<String>) {
        self.entries().push(path.into());
    }

    pub fn history(&self) -> Vec<String> {
        self.entries().clone()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<String>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> Option<String> {
        self.entries().last().cloned()
    }

    fn redirect_to_login(&self, return_path: Option<&str>) {
        let location = login_location(&self.login_path, return_path);
        info!(%location, "redirect to login");
        self.push(location);
    }
}

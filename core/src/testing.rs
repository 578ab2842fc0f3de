//! Recording fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::feedback::{ConfirmPrompt, HistoryNavigator, LoadingIndicator, Notifier, SessionDialog};
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::{Hooks, Pipeline};
use crate::session::SessionStore;
use crate::transport::Transport;

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    shows: AtomicUsize,
    hides: AtomicUsize,
}

impl RecordingIndicator {
    pub fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn visible(&self) -> bool {
        self.shows() > self.hides()
    }
}

impl LoadingIndicator for RecordingIndicator {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Error notifications, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }
}

/// Dialog that always gives the same answer and counts how often it opened.
#[derive(Debug)]
pub struct CountingDialog {
    answer: bool,
    opened: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingDialog {
    pub fn new(answer: bool) -> Self {
        Self { answer, opened: AtomicUsize::new(0), delay: None }
    }

    /// Keep the dialog open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionDialog for CountingDialog {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub request: HttpRequest,
    pub timeout: Duration,
}

/// Transport that replays queued outcomes; the last one repeats.
#[derive(Debug)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Suspend every call for `delay` so requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn ok(status: u16, body: &str) -> Self {
        Self::new(vec![Ok(response(status, body))])
    }

    pub fn failing(err: TransportError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(
        &self,
        url: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            request,
            timeout,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap()
        }
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}

/// A pipeline wired to fakes, with handles to inspect each of them.
pub struct Harness {
    pub pipeline: Pipeline,
    pub transport: Arc<ScriptedTransport>,
    pub indicator: Arc<RecordingIndicator>,
    pub notifier: Arc<RecordingNotifier>,
    pub dialog: Arc<CountingDialog>,
    pub navigator: Arc<HistoryNavigator>,
    pub session: SessionStore,
}

impl Harness {
    pub fn new(transport: ScriptedTransport, confirm: bool) -> Self {
        Self::with_dialog(transport, CountingDialog::new(confirm))
    }

    pub fn with_dialog(transport: ScriptedTransport, dialog: CountingDialog) -> Self {
        let config = ClientConfig::default();
        let transport = Arc::new(transport);
        let indicator = Arc::new(RecordingIndicator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let dialog = Arc::new(dialog);
        let navigator = Arc::new(HistoryNavigator::new(config.login_path.clone()));
        let session = SessionStore::in_memory(config.token_key.clone());
        let hooks = Hooks {
            notifier: notifier.clone(),
            indicator: indicator.clone(),
            dialog: dialog.clone(),
            navigator: navigator.clone(),
        };
        let pipeline = Pipeline::new(config, transport.clone(), session.clone(), hooks);
        Self { pipeline, transport, indicator, notifier, dialog, navigator, session }
    }

    /// The same fakes, for wiring a second pipeline or a client.
    pub fn hooks(&self) -> Hooks {
        Hooks {
            notifier: self.notifier.clone(),
            indicator: self.indicator.clone(),
            dialog: self.dialog.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

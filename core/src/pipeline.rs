//! The request pipeline: request interceptor → transport → response
//! interceptor, with the loading indicator held for the request's lifetime.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::feedback::{
    FixedDialog, HistoryNavigator, LoadingIndicator, Navigator, NoopIndicator, Notifier,
    SessionDialog, TracingNotifier,
};
use crate::http::HttpRequest;
use crate::interceptor::{RequestInterceptor, ResponseInterceptor, SessionExpiryFlow};
use crate::loading::LoadingTracker;
use crate::session::SessionStore;
use crate::status::REQUEST_EXCEPTION_MESSAGE;
use crate::transport::{Transport, TransportClient};

/// UI capabilities injected into the pipeline.
#[derive(Clone)]
pub struct Hooks {
    pub notifier: Arc<dyn Notifier>,
    pub indicator: Arc<dyn LoadingIndicator>,
    pub dialog: Arc<dyn SessionDialog>,
    pub navigator: Arc<dyn Navigator>,
}

impl Hooks {
    /// Hooks for running without a UI: notifications go to the log, the
    /// session dialog is always dismissed.
    pub fn headless(login_path: &str) -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            indicator: Arc::new(NoopIndicator),
            dialog: Arc::new(FixedDialog(false)),
            navigator: Arc::new(HistoryNavigator::new(login_path)),
        }
    }
}

pub struct Pipeline {
    transport: TransportClient,
    request: RequestInterceptor,
    response: ResponseInterceptor,
    loading: Arc<LoadingTracker>,
    notifier: Arc<dyn Notifier>,
    session: SessionStore,
}

impl Pipeline {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: SessionStore,
        hooks: Hooks,
    ) -> Self {
        let request = RequestInterceptor::new(session.clone(), config.default_headers.clone());
        let expiry = SessionExpiryFlow::new(session.clone(), hooks.dialog, hooks.navigator);
        Self {
            transport: TransportClient::new(Arc::new(config), transport),
            request,
            response: ResponseInterceptor::new(hooks.notifier.clone(), expiry),
            loading: Arc::new(LoadingTracker::new(hooks.indicator)),
            notifier: hooks.notifier,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn loading(&self) -> &LoadingTracker {
        &self.loading
    }

    /// Run one request through the pipeline.
    ///
    /// Resolves with the full envelope when its code is the success code.
    /// Every failure is both notified and returned. The loading indicator is
    /// released before the response is classified, so it is already hidden
    /// while a session-expired dialog is open.
    pub async fn send(&self, request: HttpRequest) -> Result<ResponseEnvelope, ApiError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        let loading = self.loading.acquire();
        debug!(method, %path, "request started");

        let request = match self.request.intercept(request) {
            Ok(request) => request,
            Err(err) => {
                drop(loading);
                warn!(method, %path, error = %err, "request rejected before sending");
                self.notifier.error(REQUEST_EXCEPTION_MESSAGE);
                return Err(err);
            }
        };

        let outcome = self.transport.send(request).await;
        drop(loading);

        let result = self.response.intercept(outcome).await;
        match &result {
            Ok(envelope) => debug!(method, %path, code = envelope.code, "request succeeded"),
            Err(err) => warn!(method, %path, error = %err, "request failed"),
        }
        result
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("transport", &self.transport)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, RequestBody};
    use crate::status::NETWORK_ERROR_MESSAGE;
    use crate::testing::{response, CountingDialog, Harness, ScriptedTransport};
    use std::time::Duration;

    fn get(path: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, path)
    }

    fn assert_indicator_settled(h: &Harness) {
        assert_eq!(h.indicator.shows(), 1, "shown once");
        assert_eq!(h.indicator.hides(), 1, "hidden once");
        assert_eq!(h.pipeline.loading().open_count(), 0);
    }

    #[tokio::test]
    async fn indicator_closed_once_on_success() {
        let h = Harness::new(ScriptedTransport::ok(200, r#"{"code":200,"data":{"id":1}}"#), true);
        let env = h.pipeline.send(get("/articles/1")).await.unwrap();
        assert_eq!(env.data["id"], 1);
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn indicator_closed_once_on_application_error() {
        let h = Harness::new(ScriptedTransport::ok(200, r#"{"code":500,"message":"x"}"#), true);
        let err = h.pipeline.send(get("/articles/1")).await.unwrap_err();
        assert_eq!(err, ApiError::Application { code: 500, message: "x".into() });
        assert!(h.navigator.history().is_empty(), "never redirects");
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn indicator_closed_once_on_http_error() {
        let h = Harness::new(ScriptedTransport::ok(404, ""), true);
        h.pipeline.send(get("/articles/9")).await.unwrap_err();
        assert_eq!(h.notifier.messages(), vec!["resource not found"]);
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn indicator_closed_once_on_transport_error() {
        let h = Harness::new(ScriptedTransport::failing(TransportError::Timeout), true);
        let err = h.pipeline.send(get("/articles/1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Timeout)));
        assert_eq!(h.notifier.messages(), vec![NETWORK_ERROR_MESSAGE]);
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn rejected_descriptor_closes_indicator_and_notifies() {
        let h = Harness::new(ScriptedTransport::ok(200, r#"{"code":200}"#), true);
        let bad = HttpRequest::new(HttpMethod::Delete, "/tags/1")
            .with_body(RequestBody::Json("{}".into()));
        let err = h.pipeline.send(bad).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(h.notifier.messages(), vec![REQUEST_EXCEPTION_MESSAGE]);
        assert!(h.transport.calls().is_empty(), "never reaches the network");
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn indicator_hidden_before_session_dialog() {
        let h = Harness::new(ScriptedTransport::ok(401, ""), false);
        let err = h.pipeline.send(get("/profile")).await.unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(h.dialog.opened(), 1);
        assert_indicator_settled(&h);
    }

    #[tokio::test]
    async fn bearer_token_sent_when_stored() {
        let h = Harness::new(ScriptedTransport::ok(200, r#"{"code":200}"#), true);
        h.session.store_token("abc").unwrap();
        h.pipeline.send(get("/profile")).await.unwrap();
        let calls = h.transport.calls();
        assert_eq!(calls[0].request.header("Authorization"), Some("Bearer abc"));
        assert_eq!(calls[0].url, "/api/profile");
    }

    #[tokio::test]
    async fn confirmed_expiry_clears_token_for_next_request() {
        let h = Harness::new(
            ScriptedTransport::new(vec![
                Ok(response(200, r#"{"code":401,"message":"expired"}"#)),
                Ok(response(200, r#"{"code":200}"#)),
            ]),
            true,
        );
        h.session.store_token("abc").unwrap();
        h.pipeline.send(get("/profile")).await.unwrap_err();
        assert_eq!(h.navigator.history(), vec!["/login"]);

        h.pipeline.send(get("/articles/page")).await.unwrap();
        let calls = h.transport.calls();
        assert_eq!(calls[1].request.header("Authorization"), None);
    }

    #[tokio::test]
    async fn identical_gets_are_not_memoized() {
        let h = Harness::new(ScriptedTransport::ok(200, r#"{"code":200,"data":[]}"#), true);
        h.pipeline.send(get("/tags")).await.unwrap();
        h.pipeline.send(get("/tags")).await.unwrap();
        assert_eq!(h.transport.calls().len(), 2);
        assert_eq!(h.indicator.shows(), 2);
        assert_eq!(h.indicator.hides(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_the_indicator() {
        let transport = ScriptedTransport::ok(200, r#"{"code":200}"#).with_delay(Duration::from_millis(50));
        let h = Harness::new(transport, true);
        let observe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            (h.pipeline.loading().open_count(), h.indicator.shows(), h.indicator.visible())
        };
        let (a, b, in_flight) = tokio::join!(
            h.pipeline.send(get("/tags")),
            h.pipeline.send(get("/categories")),
            observe
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(in_flight, (2, 1, true), "both requests open, indicator shown once");
        assert_eq!(h.indicator.shows(), 1);
        assert_eq!(h.indicator.hides(), 1);
        assert_eq!(h.pipeline.loading().open_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_expiries_open_one_dialog() {
        let dialog = CountingDialog::new(true).with_delay(Duration::from_millis(50));
        let h = Harness::with_dialog(ScriptedTransport::ok(401, ""), dialog);
        h.session.store_token("abc").unwrap();
        let (a, b) = tokio::join!(h.pipeline.send(get("/tags")), h.pipeline.send(get("/categories")));
        assert!(a.unwrap_err().is_session_expired());
        assert!(b.unwrap_err().is_session_expired());
        assert_eq!(h.dialog.opened(), 1);
        assert_eq!(h.navigator.history(), vec!["/login"]);
        assert_eq!(h.session.token().unwrap(), None);
    }
}

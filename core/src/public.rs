//! Public site comment form.
//!
//! Visitors post comments to the site root, outside the admin `/api` base
//! and without a session. The reply is still an envelope, but the admin
//! interceptors do not run: there is no token to attach and nothing to
//! redirect on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ClientConfig, MULTIPART_CONTENT_TYPE};
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::feedback::Notifier;
use crate::http::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
use crate::status::NETWORK_ERROR_MESSAGE;
use crate::transport::{Transport, TransportClient};
use crate::types::Id;

pub const SUBMIT_COMMENT_PATH: &str = "/comment/submit";
pub const COMMENT_SUBMITTED_MESSAGE: &str = "comment submitted, awaiting review";
pub const COMMENT_FAILED_MESSAGE: &str = "comment submission failed";

/// A visitor's comment. `parent_id` is `-1` for a top-level comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    pub article_id: Id,
    #[serde(rename = "pId")]
    pub parent_id: i64,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub website: String,
    pub content: String,
}

pub fn build_submit_comment(comment: &CommentSubmission) -> HttpRequest {
    let form = MultipartForm::new()
        .text("articleId", comment.article_id.to_string())
        .text("pId", comment.parent_id.to_string())
        .text("userName", comment.user_name.clone())
        .text("email", comment.email.clone())
        .text("website", comment.website.clone())
        .text("content", comment.content.clone());
    HttpRequest::new(HttpMethod::Post, SUBMIT_COMMENT_PATH)
        .with_header("Content-Type", MULTIPART_CONTENT_TYPE)
        .with_body(RequestBody::Multipart(form))
}

pub struct PublicSite {
    client: TransportClient,
    notifier: Arc<dyn Notifier>,
}

impl PublicSite {
    /// `site_url` is the site root, e.g. `http://localhost:8080`.
    pub fn new(site_url: &str, transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        let config = ClientConfig::default().with_base_url(site_url);
        Self {
            client: TransportClient::new(Arc::new(config), transport),
            notifier,
        }
    }

    /// Submit a comment for review. The envelope code decides the outcome
    /// whatever the HTTP status. A reply that is not an envelope is reported
    /// like a network failure.
    pub async fn submit_comment(
        &self,
        comment: &CommentSubmission,
    ) -> Result<ResponseEnvelope, ApiError> {
        let response = match self.client.send(build_submit_comment(comment)).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "comment submission got no response");
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(err.into());
            }
        };

        let envelope = match ResponseEnvelope::parse(&response.body) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(status = response.status, "comment reply is not an envelope");
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                return Err(err);
            }
        };

        if envelope.is_success() {
            info!(article_id = comment.article_id, "comment submitted");
            self.notifier.success(COMMENT_SUBMITTED_MESSAGE);
            return Ok(envelope);
        }

        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| COMMENT_FAILED_MESSAGE.to_string());
        self.notifier.error(&message);
        Err(ApiError::Application {
            code: envelope.code,
            message,
        })
    }
}

impl std::fmt::Debug for PublicSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicSite").field("client", &self.client).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::FormPart;
    use crate::testing::{RecordingNotifier, ScriptedTransport};

    fn submission() -> CommentSubmission {
        CommentSubmission {
            article_id: 7,
            parent_id: -1,
            user_name: "ann".into(),
            email: "ann@example.com".into(),
            website: String::new(),
            content: "nice post".into(),
        }
    }

    fn site(transport: ScriptedTransport) -> (PublicSite, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
        let transport = Arc::new(transport);
        let notifier = Arc::new(RecordingNotifier::default());
        let site = PublicSite::new("http://blog.test/", transport.clone(), notifier.clone());
        (site, transport, notifier)
    }

    #[test]
    fn form_carries_every_field() {
        let req = build_submit_comment(&submission());
        let form = req.body.as_ref().and_then(|b| b.as_multipart()).unwrap();
        for (name, expected) in [("articleId", "7"), ("pId", "-1"), ("userName", "ann"), ("content", "nice post")] {
            match form.part(name) {
                Some(FormPart::Text { value, .. }) => assert_eq!(value, expected, "{name}"),
                other => panic!("{name}: {other:?}"),
            }
        }
        assert!(form.part("website").is_some());
    }

    #[tokio::test]
    async fn accepted_comment_notifies_success() {
        let (site, transport, notifier) = site(ScriptedTransport::ok(200, r#"{"code":200,"msg":"ok"}"#));
        site.submit_comment(&submission()).await.unwrap();
        assert_eq!(transport.calls()[0].url, "http://blog.test/comment/submit");
        assert_eq!(notifier.successes(), vec![COMMENT_SUBMITTED_MESSAGE]);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn rejected_comment_reports_server_message() {
        let (site, _, notifier) = site(ScriptedTransport::ok(400, r#"{"code":400,"msg":"content required"}"#));
        let err = site.submit_comment(&submission()).await.unwrap_err();
        assert_eq!(err, ApiError::Application { code: 400, message: "content required".into() });
        assert_eq!(notifier.messages(), vec!["content required"]);
    }

    #[tokio::test]
    async fn html_reply_is_reported_as_network_error() {
        let (site, _, notifier) = site(ScriptedTransport::ok(200, "<html>article page</html>"));
        let err = site.submit_comment(&submission()).await.unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        assert_eq!(notifier.messages(), vec![NETWORK_ERROR_MESSAGE]);
    }

    #[tokio::test]
    async fn network_failure_is_notified() {
        let (site, _, notifier) = site(ScriptedTransport::failing(TransportError::Connect("refused".into())));
        let err = site.submit_comment(&submission()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(notifier.messages(), vec![NETWORK_ERROR_MESSAGE]);
    }
}

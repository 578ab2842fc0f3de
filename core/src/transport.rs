//! Network boundary.
//!
//! # Design
//! `Transport` is the single place that performs I/O. `TransportClient` owns
//! the static configuration (base URL, timeout) and feeds fully-resolved
//! requests to whichever `Transport` it was built with: `ReqwestTransport`
//! in production, scripted fakes in tests.
//!
//! A transport only fails when no HTTP response arrives. Any response,
//! whatever its status, is returned as data for the response interceptor
//! to classify.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

/// Executes one HTTP round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `url` is the base URL joined with `request.path`; it may still be
    /// relative to the transport's origin.
    async fn execute(
        &self,
        url: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Static configuration bound to a transport.
#[derive(Clone)]
pub struct TransportClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl TransportClient {
    pub fn new(config: Arc<ClientConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.config.url_for(&request.path);
        debug!(method = request.method.as_str(), %url, "sending request");
        self.transport.execute(&url, request, self.config.timeout).await
    }
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Reqwest-backed transport.
///
/// Relative URLs (the default `/api` base) are resolved against `origin`,
/// the way a browser resolves them against the page's origin.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<String>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cms-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client, origin: None }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, url: &str) -> Result<String, TransportError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(url.to_string());
        }
        match &self.origin {
            Some(origin) => Ok(format!("{origin}{url}")),
            None => Err(TransportError::Other(format!("relative URL {url} without an origin"))),
        }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
        let mut out = reqwest::multipart::Form::new();
        for part in form.parts {
            out = match part {
                FormPart::Text { name, value } => out.text(name, value),
                FormPart::File { name, file_name, content_type, data } => {
                    let mut file = reqwest::multipart::Part::bytes(data.to_vec()).file_name(file_name);
                    if let Some(ct) = content_type {
                        file = file.mime_str(&ct).map_err(|e| TransportError::Other(e.to_string()))?;
                    }
                    out.part(name, file)
                }
            };
        }
        Ok(out)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        url: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(url)?;
        let multipart = request.is_multipart();
        let mut builder = self
            .client
            .request(Self::convert_method(request.method), &url)
            .timeout(timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // reqwest writes its own multipart content type with the boundary.
        for (name, value) in &request.headers {
            if multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name, value);
        }

        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Multipart(form)) => builder.multipart(Self::build_form(form)?),
            None => builder,
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();
        let body = response.text().await.map_err(classify)?;

        Ok(HttpResponse { status, headers, body })
    }
}

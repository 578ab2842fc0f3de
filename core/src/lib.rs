//! Async HTTP client core for the CMS admin backend.
//!
//! # Overview
//! Every admin call flows through one pipeline: the request interceptor
//! attaches default headers and the bearer token, a `Transport` performs the
//! round-trip, and the response interceptor turns the outcome into either
//! the backend's success envelope or a classified `ApiError`. Failures are
//! reported to the user through injected UI hooks as well as returned.
//!
//! # Design
//! - `api::*::build_*` functions are pure: they only produce `HttpRequest`
//!   values, so route shapes are testable without a network.
//! - `Transport` is the only I/O seam. `ReqwestTransport` is the production
//!   implementation; tests script their own.
//! - UI concerns (toasts, loading indicator, session dialog, router) are
//!   traits in `feedback`, bundled as `pipeline::Hooks`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod feedback;
pub mod http;
pub mod interceptor;
pub mod loading;
pub mod pipeline;
pub mod public;
pub mod session;
pub mod status;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::CmsClient;
pub use config::ClientConfig;
pub use envelope::{PageData, ResponseEnvelope};
pub use error::{ApiError, ConfigError, StorageError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{Hooks, Pipeline};
pub use public::{CommentSubmission, PublicSite};
pub use session::{FileStorage, MemoryStorage, SessionStore};
pub use transport::{ReqwestTransport, Transport, TransportClient};

//! Error types for the CMS client.
//!
//! # Design
//! The variants follow the order in which the response interceptor
//! classifies an outcome: no response at all (`Transport`), a non-2xx
//! response (`HttpStatus`), a 2xx response whose envelope reports failure
//! (`Application`). A 401 from either of the last two paths becomes
//! `SessionExpired` because it carries the extra re-login side effect.

use thiserror::Error;

/// Failures that happen before any HTTP response is received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// Errors returned by pipeline and client operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No HTTP response was received (DNS, refused connection, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status other than 401.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// HTTP 2xx, but the envelope code is not the success code.
    #[error("{message} (code {code})")]
    Application { code: i64, message: String },

    /// HTTP 401 or envelope code 401.
    #[error("session expired: {message}")]
    SessionExpired { message: String },

    /// The descriptor was rejected before it reached the transport.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("session storage failed: {0}")]
    Storage(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }

    /// HTTP status for `HttpStatus`, envelope code for `Application`.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(i64::from(*status)),
            ApiError::Application { code, .. } => Some(*code),
            ApiError::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }
}

/// Errors raised while reading client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors raised by durable key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

//! Static client configuration.
//!
//! Values come from the environment when present (`CMS_API_BASE_URL`,
//! `CMS_API_TIMEOUT_MS`) and otherwise fall back to the admin frontend's
//! defaults.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

const BASE_URL_VAR: &str = "CMS_API_BASE_URL";
const TIMEOUT_VAR: &str = "CMS_API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix joined in front of every descriptor path. May be relative
    /// (`/api`), in which case the transport resolves it against its origin.
    pub base_url: String,
    pub timeout: Duration,
    /// Headers applied to every request unless the caller set them.
    pub default_headers: Vec<(String, String)>,
    /// Storage key holding the session token.
    pub token_key: String,
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())],
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(&base_url);
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            if millis == 0 {
                return Err(ConfigError::InvalidValue { key: TIMEOUT_VAR, value: raw });
            }
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join the base URL and a descriptor path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

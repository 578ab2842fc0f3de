//! Authentication routes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::LoginRequest;

pub fn build_login(account: &str, password: &str) -> Result<HttpRequest, ApiError> {
    let body = LoginRequest {
        account: account.to_string(),
        password: password.to_string(),
    };
    super::json_request(HttpMethod::Post, "/login".to_string(), &body)
}

pub fn build_logout() -> HttpRequest {
    HttpRequest::new(HttpMethod::Post, "/logout")
}

pub fn build_profile() -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "/profile")
}

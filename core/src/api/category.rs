//! Category routes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CategoryInput, Id, NameQuery};

pub fn build_list_categories(query: &NameQuery) -> Result<HttpRequest, ApiError> {
    super::query_request("/categories/page", query)
}

/// Every category, unpaged.
pub fn build_all_categories() -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "/categories")
}

pub fn build_create_category(input: &CategoryInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Post, "/categories".to_string(), input)
}

pub fn build_update_category(id: Id, input: &CategoryInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Put, format!("/categories/{id}"), input)
}

pub fn build_delete_category(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("/categories/{id}"))
}

pub fn build_get_category(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("/categories/{id}"))
}

//! Article routes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{ArticleInput, ArticleQuery, Id};

pub fn build_list_articles(query: &ArticleQuery) -> Result<HttpRequest, ApiError> {
    super::query_request("/articles/page", query)
}

pub fn build_get_article(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("/articles/{id}"))
}

pub fn build_create_article(input: &ArticleInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Post, "/articles".to_string(), input)
}

pub fn build_update_article(id: Id, input: &ArticleInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Put, format!("/articles/{id}"), input)
}

pub fn build_delete_article(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("/articles/{id}"))
}

//! API wrapper set.
//!
//! # Design
//! Every backend operation is a pure `build_*` function from typed
//! arguments to an `HttpRequest`. Wrappers do no error handling of their
//! own; classification happens once, in the response interceptor.
//! Identifiers are interpolated into the path as-is.
//!
//! The auth routes are `/login`, `/logout` and `/profile`, and article
//! listing is `GET /articles/page` with `page`/`pageSize`, matching the
//! routes the backend registers.

pub mod article;
pub mod attach;
pub mod auth;
pub mod category;
pub mod comment;
pub mod tag;

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, RequestBody};

pub(crate) fn json_request<T: Serialize>(
    method: HttpMethod,
    path: String,
    body: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest::new(method, path).with_body(RequestBody::Json(body)))
}

pub(crate) fn query_request<T: Serialize>(path: &str, query: &T) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest::new(HttpMethod::Get, path).with_query(query_pairs(query)?))
}

/// Flatten a query struct into ordered key/value pairs.
pub(crate) fn query_pairs<T: Serialize>(query: &T) -> Result<Vec<(String, String)>, ApiError> {
    let encoded =
        serde_urlencoded::to_string(query).map_err(|e| ApiError::Serialization(e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommentQuery, Paging};

    #[test]
    fn query_pairs_keep_field_order_and_skip_none() {
        let q = CommentQuery {
            paging: Paging { page: 3, page_size: 15 },
            status: Some(1),
            article_id: None,
            keyword: Some("a b".into()),
        };
        let pairs = query_pairs(&q).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "3".to_string()),
                ("pageSize".to_string(), "15".to_string()),
                ("status".to_string(), "1".to_string()),
                ("keyword".to_string(), "a b".to_string()),
            ]
        );
    }
}

//! Comment moderation routes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{BatchReview, CommentQuery, CommentStatus, CommentStatusUpdate, Id};

pub fn build_list_comments(query: &CommentQuery) -> Result<HttpRequest, ApiError> {
    super::query_request("/comments/page", query)
}

pub fn build_update_comment_status(id: Id, status: CommentStatus) -> Result<HttpRequest, ApiError> {
    super::json_request(
        HttpMethod::Put,
        format!("/comments/{id}/status"),
        &CommentStatusUpdate { status },
    )
}

pub fn build_delete_comment(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("/comments/{id}"))
}

pub fn build_batch_review_comments(ids: &[Id], status: CommentStatus) -> Result<HttpRequest, ApiError> {
    let body = BatchReview {
        ids: ids.to_vec(),
        status,
    };
    super::json_request(HttpMethod::Post, "/comments/batch-review".to_string(), &body)
}

pub fn build_get_comment(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("/comments/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_ref().and_then(|b| b.as_json()).unwrap()).unwrap()
    }

    #[test]
    fn status_update_targets_status_subresource() {
        let req = build_update_comment_status(9, CommentStatus::Approved).unwrap();
        assert_eq!((req.method, req.path.as_str()), (HttpMethod::Put, "/comments/9/status"));
        assert_eq!(json(&req), serde_json::json!({"status": 0}));
    }

    #[test]
    fn batch_review_posts_ids_and_status() {
        let req = build_batch_review_comments(&[1, 2, 3], CommentStatus::Pending).unwrap();
        assert_eq!((req.method, req.path.as_str()), (HttpMethod::Post, "/comments/batch-review"));
        assert_eq!(json(&req), serde_json::json!({"ids": [1, 2, 3], "status": 1}));
    }
}

//! Tag routes.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{Id, NameQuery, TagInput};

pub fn build_list_tags(query: &NameQuery) -> Result<HttpRequest, ApiError> {
    super::query_request("/tags/page", query)
}

pub fn build_all_tags() -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "/tags")
}

/// Tags are created on `/tags/create`, unlike categories.
pub fn build_create_tag(input: &TagInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Post, "/tags/create".to_string(), input)
}

pub fn build_update_tag(id: Id, input: &TagInput) -> Result<HttpRequest, ApiError> {
    super::json_request(HttpMethod::Put, format!("/tags/{id}"), input)
}

pub fn build_delete_tag(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("/tags/{id}"))
}

pub fn build_get_tag(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("/tags/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Paging;

    #[test]
    fn create_uses_create_route() {
        let req = build_create_tag(&TagInput { name: "async".into(), ..Default::default() }).unwrap();
        assert_eq!((req.method, req.path.as_str()), (HttpMethod::Post, "/tags/create"));
    }

    #[test]
    fn list_filters_by_name() {
        let req = build_list_tags(&NameQuery {
            paging: Paging::default(),
            name: Some("as".into()),
        })
        .unwrap();
        assert_eq!(req.path, "/tags/page");
        assert!(req.query.contains(&("name".to_string(), "as".to_string())));
    }
}

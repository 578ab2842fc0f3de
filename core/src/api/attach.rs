//! Attachment routes.

use crate::config::MULTIPART_CONTENT_TYPE;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, MultipartForm, RequestBody};
use crate::types::{Id, NameQuery, UploadFile};

/// Form field the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

pub fn build_list_attachments(query: &NameQuery) -> Result<HttpRequest, ApiError> {
    super::query_request("/attach/page", query)
}

pub fn build_upload_attachment(file: &UploadFile) -> HttpRequest {
    let form = MultipartForm::new().file(
        UPLOAD_FIELD,
        file.file_name.clone(),
        file.content_type.clone(),
        file.data.clone(),
    );
    HttpRequest::new(HttpMethod::Post, "/attach/upload")
        .with_header("Content-Type", MULTIPART_CONTENT_TYPE)
        .with_body(RequestBody::Multipart(form))
}

pub fn build_delete_attachment(id: Id) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("/attach/{id}"))
}

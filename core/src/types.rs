//! Domain DTOs for the CMS API.
//!
//! # Design
//! Field names follow the backend's JSON (mostly camelCase; attachments use
//! snake_case). Response types default every field except `id`, so a
//! partially-populated record from an older backend still decodes.

use serde::{Deserialize, Serialize};

pub type Id = u64;

/// Paging parameters shared by every `/page` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { page: 1, page_size: 10 }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Id,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

/// `data` of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserProfile,
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    #[serde(flatten)]
    pub paging: Paging,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub summary: String,
    pub thumbnail: String,
    pub category_ids: Vec<Id>,
    pub tag_ids: Vec<Id>,
    pub add_tags: Vec<String>,
    pub meta_title: String,
    pub meta_keywords: String,
    pub meta_description: String,
    pub content_model: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_top: i8,
    pub is_comment: i8,
    pub status: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: Id,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub thumbnail: String,
    pub content_model: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: i8,
    pub is_top: i8,
    pub is_comment: i8,
    pub view_count: u64,
    pub category_ids: Vec<Id>,
    pub created_at: String,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// Categories and tags
// ---------------------------------------------------------------------------

/// Query for name-filtered pages (categories, tags, attachments).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameQuery {
    #[serde(flatten)]
    pub paging: Paging,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryInput {
    pub name: String,
    #[serde(rename = "pId")]
    pub parent_id: i64,
    pub slug: String,
    pub desc: String,
    pub thumbnail: String,
    pub meta_keywords: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: Id,
    pub name: String,
    pub pid: i64,
    pub desc: String,
    pub slug: String,
    pub thumbnail: String,
    pub status: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagInput {
    pub name: String,
    pub color: String,
    pub slug: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
    pub thumbnail: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Review state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum CommentStatus {
    Approved,
    Pending,
}

impl From<CommentStatus> for i32 {
    fn from(status: CommentStatus) -> i32 {
        match status {
            CommentStatus::Approved => 0,
            CommentStatus::Pending => 1,
        }
    }
}

impl TryFrom<i32> for CommentStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommentStatus::Approved),
            1 => Ok(CommentStatus::Pending),
            other => Err(format!("unknown comment status {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    #[serde(flatten)]
    pub paging: Paging,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    #[serde(default)]
    pub article_id: Id,
    #[serde(default = "no_parent", rename = "pId")]
    pub parent_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "pending")]
    pub status: CommentStatus,
    #[serde(default)]
    pub created_at: String,
}

fn no_parent() -> i64 {
    -1
}

fn pending() -> CommentStatus {
    CommentStatus::Pending
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentStatusUpdate {
    pub status: CommentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReview {
    pub ids: Vec<Id>,
    pub status: CommentStatus,
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: Id,
    pub name: String,
    pub path: String,
    pub url: String,
    #[serde(rename = "mine_type")]
    pub mime_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attach_group: String,
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: bytes::Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn article_query_flattens_paging_and_skips_unset_filters() {
        let q = ArticleQuery {
            paging: Paging { page: 2, page_size: 20 },
            title: Some("rust".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"page": 2, "pageSize": 20, "title": "rust"})
        );
    }

    #[test]
    fn comment_status_is_numeric_on_the_wire() {
        let body = BatchReview { ids: vec![1, 2], status: CommentStatus::Approved };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"ids": [1, 2], "status": 0}));
        let s: CommentStatus = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(s, CommentStatus::Pending);
        assert!(serde_json::from_value::<CommentStatus>(json!(7)).is_err());
    }

    #[test]
    fn comment_defaults_for_missing_fields() {
        let c: Comment = serde_json::from_value(json!({"id": 5, "content": "hi"})).unwrap();
        assert_eq!(c.parent_id, -1);
        assert_eq!(c.status, CommentStatus::Pending);
    }

    #[test]
    fn attachment_uses_backend_field_names() {
        let a: Attachment = serde_json::from_value(json!({
            "id": 3, "name": "a.png", "mine_type": "image/png", "type": "image", "url": "/uploads/a.png"
        }))
        .unwrap();
        assert_eq!(a.mime_type, "image/png");
        assert_eq!(a.kind, "image");
    }

    #[test]
    fn login_data_decodes() {
        let d: LoginData = serde_json::from_value(json!({
            "token": "abc", "user": {"id": 1, "username": "Admin", "account": "admin"}
        }))
        .unwrap();
        assert_eq!(d.token, "abc");
        assert_eq!(d.user.account, "admin");
        assert_eq!(d.user.email, "");
    }
}

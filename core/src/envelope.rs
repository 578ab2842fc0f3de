//! The backend's response envelope: `{ code, message?, data }`.
//!
//! `code == SUCCESS_CODE` is the only success signal; the HTTP status of a
//! 2xx response says nothing about the outcome of the operation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const SUCCESS_CODE: i64 = 200;
pub const SESSION_EXPIRED_CODE: i64 = 401;

/// A decoded response envelope. Callers receive the whole envelope and
/// unwrap `data` themselves with `into_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ResponseEnvelope<T = serde_json::Value> {
    pub code: i64,
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: T,
}

impl ResponseEnvelope {
    pub fn parse(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Decode `data` into a typed payload.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.data).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

impl<T> ResponseEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Payload of every `/page` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    pub list: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_envelope() {
        let env = ResponseEnvelope::parse(r#"{"code":200,"message":"ok","data":{"id":1}}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.message.as_deref(), Some("ok"));
        assert_eq!(env.data, json!({"id": 1}));
    }

    #[test]
    fn message_and_data_are_optional() {
        let env = ResponseEnvelope::parse(r#"{"code":500}"#).unwrap();
        assert!(!env.is_success());
        assert!(env.message.is_none());
        assert!(env.data.is_null());
    }

    #[test]
    fn accepts_msg_alias() {
        let env = ResponseEnvelope::parse(r#"{"code":400,"msg":"bad"}"#).unwrap();
        assert_eq!(env.message.as_deref(), Some("bad"));
    }

    #[test]
    fn rejects_body_without_code() {
        let err = ResponseEnvelope::parse(r#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn into_data_decodes_page() {
        let env = ResponseEnvelope::parse(
            r#"{"code":200,"data":{"list":[1,2],"total":2,"page":1,"pageSize":10}}"#,
        )
        .unwrap();
        let page: PageData<u32> = env.into_data().unwrap();
        assert_eq!(page.list, vec![1, 2]);
        assert_eq!(page.page_size, 10);
    }
}

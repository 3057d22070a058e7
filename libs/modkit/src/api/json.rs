//! Request body decoding helpers.
//!
//! Handlers that need to run checks before looking at the body (or that want
//! their own error envelope instead of axum's plain-text rejection) take the
//! raw body and decode it with these helpers.

use axum::extract::rejection::JsonRejection;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JsonBodyError {
    #[error("request body is empty")]
    Empty,
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),
    #[error("request body must be a JSON object")]
    NotAnObject,
}

/// Decode `bytes` as a JSON object. Whitespace-only bodies count as empty.
pub fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, JsonBodyError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(JsonBodyError::Empty);
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JsonBodyError::NotAnObject),
        Err(e) => Err(JsonBodyError::Malformed(e.to_string())),
    }
}

/// Human-readable detail for an axum JSON extractor rejection.
pub fn rejection_detail(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    }
}

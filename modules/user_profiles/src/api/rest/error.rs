use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::rest::dto::ErrorBody;
use crate::domain::error::ProfileError;

/// `{code, message}` with its HTTP status.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound { .. } => Self::not_found(),
            ProfileError::AlreadyExists { id } => Self::new(
                StatusCode::BAD_REQUEST,
                "USER_ALREADY_EXISTS",
                format!("User {id} already exists"),
            ),
            ProfileError::BadRequest { message } => Self::bad_request(message),
            ProfileError::Storage { message } => {
                // Log the internal error details but don't expose them to the client
                tracing::error!(error = %message, "Database error occurred");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DB_ERROR",
                    "Database error",
                )
            }
        }
    }
}

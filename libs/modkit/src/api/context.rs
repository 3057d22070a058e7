use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// What an error envelope needs to know about the request it answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCtx {
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestCtx {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            request_id: None,
        }
    }
}

impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        Ok(Self {
            path: parts.uri.path().to_owned(),
            request_id,
        })
    }
}

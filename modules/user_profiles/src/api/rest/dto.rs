use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope of the `/api/users` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// `USER_NOT_FOUND`, `BAD_REQUEST`, `USER_ALREADY_EXISTS` or `DB_ERROR`
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    pub message: String,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// A user in blob form. The wire shape is camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Arbitrary keys such as `fullName`, `bio`, `avatarUrl`, `birthDate`, `address`
    #[schema(value_type = Object)]
    pub profile: Map<String, Value>,
    pub tags: Vec<String>,
    /// Arbitrary keys such as `theme`, `notifications`
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
}

impl UserProfile {
    /// Fresh profile with defaults for everything but the required fields.
    pub fn new(user_id: Uuid, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
            profile: Map::new(),
            tags: Vec::new(),
            preferences: Map::new(),
        }
    }
}

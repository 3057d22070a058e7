use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::error::DomainError;

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// REST DTO for updating a user (partial).
///
/// A key that is absent leaves the attribute alone; a key sent as `null`
/// is kept apart from absence so optional columns can be cleared.
/// `id`, `created_at` and `updated_at` are not part of the document and
/// are dropped by serde if a client sends them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserReq {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub department: Option<Option<String>>,
}

/// `GET /users` body: a bare JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserListDto(pub Vec<UserDto>);

/// Query parameters of `GET /users`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListUsersQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

// A present key always lands in `Some`, so `null` becomes `Some(None)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            department: user.department,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            username: req.username,
            email: req.email,
            full_name: req.full_name,
            department: req.department,
        }
    }
}

impl UpdateUserReq {
    /// `username` and `email` are required columns and cannot be nulled.
    pub fn into_patch(self) -> Result<UserPatch, DomainError> {
        Ok(UserPatch {
            username: required(self.username, "username")?,
            email: required(self.email, "email")?,
            full_name: self.full_name,
            department: self.department,
        })
    }
}

fn required(value: Option<Option<String>>, field: &str) -> Result<Option<String>, DomainError> {
    match value {
        Some(None) => Err(DomainError::validation(field, "must not be null")),
        Some(Some(v)) => Ok(Some(v)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(v: serde_json::Value) -> UpdateUserReq {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn absent_and_null_are_distinct() {
        let patch = req(json!({ "full_name": null })).into_patch().unwrap();
        assert_eq!(patch.full_name, Some(None));
        assert_eq!(patch.department, None);
        assert!(patch.username.is_none());
    }

    #[test]
    fn null_required_field_is_rejected() {
        let err = req(json!({ "email": null })).into_patch().unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "email"));
    }

    #[test]
    fn server_managed_fields_are_ignored() {
        let patch = req(json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "created_at": "2020-01-01T00:00:00Z",
            "updated_at": "2020-01-01T00:00:00Z",
            "department": "Ops"
        }))
        .into_patch()
        .unwrap();
        assert_eq!(patch.department, Some(Some("Ops".to_string())));
        assert!(patch.username.is_none() && patch.email.is_none());
    }

    #[test]
    fn empty_document_is_an_empty_patch() {
        assert!(req(json!({})).into_patch().unwrap().is_empty());
    }

    #[test]
    fn user_dto_serializes_missing_optionals_as_null() {
        let now = Utc::now();
        let dto = UserDto::from(User {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@example.com".into(),
            full_name: None,
            department: None,
            created_at: now,
            updated_at: now,
        });
        let v = serde_json::to_value(dto).unwrap();
        assert!(v["full_name"].is_null());
        assert!(v.as_object().unwrap().contains_key("department"));
    }
}

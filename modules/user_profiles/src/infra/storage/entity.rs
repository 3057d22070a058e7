use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::contract::model::UserProfile;

/// `profile`, `tags` and `preferences` are stored as JSON text.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub profile: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub preferences: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode_object(raw: Option<&str>, column: &str) -> anyhow::Result<Map<String, Value>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Map::new()),
        Some(s) => serde_json::from_str(s).with_context(|| format!("decode {column} column")),
    }
}

impl TryFrom<Model> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let tags = match m.tags.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Vec::new(),
            Some(s) => serde_json::from_str(s).context("decode tags column")?,
        };
        Ok(Self {
            user_id: m.user_id,
            username: m.username,
            email: m.email,
            created_at: m.created_at,
            last_login: m.last_login,
            is_active: m.is_active,
            profile: decode_object(m.profile.as_deref(), "profile")?,
            tags,
            preferences: decode_object(m.preferences.as_deref(), "preferences")?,
        })
    }
}

impl TryFrom<UserProfile> for ActiveModel {
    type Error = anyhow::Error;

    fn try_from(p: UserProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Set(p.user_id),
            username: Set(p.username),
            email: Set(p.email),
            created_at: Set(p.created_at),
            last_login: Set(p.last_login),
            is_active: Set(p.is_active),
            profile: Set(Some(serde_json::to_string(&p.profile)?)),
            tags: Set(Some(serde_json::to_string(&p.tags)?)),
            preferences: Set(Some(serde_json::to_string(&p.preferences)?)),
        })
    }
}

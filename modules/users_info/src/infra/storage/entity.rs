use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use uuid::Uuid;

use crate::contract::model::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            full_name: m.full_name,
            department: m.department,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<User> for ActiveModel {
    fn from(u: User) -> Self {
        Self {
            id: Set(u.id),
            username: Set(u.username),
            email: Set(u.email),
            full_name: Set(u.full_name),
            department: Set(u.department),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        }
    }
}

//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a pooled
//! `DatabaseConnection` as well as with a transaction.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::{UniqueField, UsersRepository};
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<User>> {
        // OFFSET/LIMIT are bound as signed 64-bit integers.
        let skip = skip.min(i64::MAX as u64);
        let limit = limit.min(i64::MAX as u64);
        let rows = UserEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by(&self, field: UniqueField, value: &str) -> anyhow::Result<Option<User>> {
        let column = match field {
            UniqueField::Username => Column::Username,
            UniqueField::Email => Column::Email,
        };
        let found = UserEntity::find()
            .filter(column.eq(value))
            .one(&self.conn)
            .await
            .with_context(|| format!("find_by {field:?} failed"))?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, u: User) -> anyhow::Result<User> {
        let m: UserAM = u.into();
        let saved = m.insert(&self.conn).await.context("insert failed")?;
        Ok(saved.into())
    }

    async fn update(&self, u: User) -> anyhow::Result<User> {
        let m: UserAM = u.into();
        let saved = m.update(&self.conn).await.context("update failed")?;
        Ok(saved.into())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

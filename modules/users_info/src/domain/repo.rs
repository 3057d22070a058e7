use crate::contract::model::User;
use async_trait::async_trait;
use uuid::Uuid;

/// Columns that carry a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Window of `limit` users after skipping `skip`, in creation order.
    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Exact match on a unique column.
    async fn find_by(&self, field: UniqueField, value: &str) -> anyhow::Result<Option<User>>;

    /// Persist a fully-formed user; the service computes id and timestamps.
    async fn insert(&self, u: User) -> anyhow::Result<User>;

    /// Overwrite the stored user with the same `u.id`.
    async fn update(&self, u: User) -> anyhow::Result<User>;

    /// Returns true if a user was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

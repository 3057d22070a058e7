use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::UserProfile;

/// Storage port for blob-form users. There is no list and no delete.
#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>>;

    /// Insert, or replace the stored profile with the same `user_id`, atomically.
    async fn upsert(&self, profile: UserProfile) -> anyhow::Result<()>;
}

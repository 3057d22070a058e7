use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User, UserPatch},
};

/// Public API of the users_info module for in-process callers
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<User, UsersInfoError>;

    /// Offset/count window over creation order
    async fn list_users(
        &self,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<User>, UsersInfoError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersInfoError>;

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, UsersInfoError>;

    async fn delete_user(&self, id: Uuid) -> Result<(), UsersInfoError>;
}

//! SeaORM-backed profile store.

use anyhow::Context;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::contract::model::UserProfile;
use crate::domain::repo::ProfilesRepository;
use crate::infra::storage::entity::{ActiveModel as ProfileAM, Column, Entity as ProfileEntity};

pub struct SeaOrmProfilesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmProfilesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> ProfilesRepository for SeaOrmProfilesRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let found = ProfileEntity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        found.map(UserProfile::try_from).transpose()
    }

    async fn upsert(&self, profile: UserProfile) -> anyhow::Result<()> {
        let am = ProfileAM::try_from(profile).context("encode profile")?;

        let txn = self.conn.begin().await.context("begin failed")?;
        let res = ProfileEntity::insert(am)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .update_columns([
                        Column::Username,
                        Column::Email,
                        Column::LastLogin,
                        Column::IsActive,
                        Column::Profile,
                        Column::Tags,
                        Column::Preferences,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await;

        match res {
            Ok(_) => {
                txn.commit().await.context("commit failed")?;
                Ok(())
            }
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    tracing::warn!(error = %rb, "rollback failed");
                }
                Err(e).context("upsert failed")
            }
        }
    }
}

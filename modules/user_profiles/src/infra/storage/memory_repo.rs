use dashmap::DashMap;
use uuid::Uuid;

use crate::contract::model::UserProfile;
use crate::domain::repo::ProfilesRepository;

/// Process-local store keyed by `userId`.
#[derive(Default)]
pub struct InMemoryProfilesRepository {
    profiles: DashMap<Uuid, UserProfile>,
}

impl InMemoryProfilesRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfilesRepository for InMemoryProfilesRepository {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.profiles.get(&user_id).map(|p| p.value().clone()))
    }

    async fn upsert(&self, profile: UserProfile) -> anyhow::Result<()> {
        self.profiles.insert(profile.user_id, profile);
        Ok(())
    }
}

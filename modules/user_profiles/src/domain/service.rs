use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::UserProfile;
use crate::domain::error::ProfileError;
use crate::domain::fields::apply_document;
use crate::domain::repo::ProfilesRepository;
use crate::domain::seed;

/// Domain service for blob-form users.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn ProfilesRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn ProfilesRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "user_profiles.service.get_profile", skip(self), fields(user_id = %id))]
    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile, ProfileError> {
        debug!("Getting profile by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| ProfileError::storage(e.to_string()))?
            .ok_or_else(|| ProfileError::not_found(id))
    }

    /// Create from a client document: `username` and `email` are required
    /// strings, `userId` is optional; the other keys follow the update rules.
    #[instrument(name = "user_profiles.service.create_profile", skip(self, doc))]
    pub async fn create_profile(
        &self,
        mut doc: Map<String, Value>,
    ) -> Result<UserProfile, ProfileError> {
        info!("Creating new profile");

        let username = take_required_string(&mut doc, "username")?;
        let email = take_required_string(&mut doc, "email")?;
        let user_id = match doc.remove("userId") {
            None | Some(Value::Null) => Uuid::new_v4(),
            Some(Value::String(s)) => Uuid::parse_str(&s)
                .map_err(|_| ProfileError::bad_request(format!("userId '{s}' is not a valid UUID")))?,
            Some(_) => return Err(ProfileError::bad_request("userId must be a string")),
        };

        if self.exists(user_id).await? {
            return Err(ProfileError::already_exists(user_id));
        }

        let mut profile = UserProfile::new(user_id, username, email);
        apply_document(&mut profile, doc);

        self.repo
            .upsert(profile.clone())
            .await
            .map_err(|e| ProfileError::storage(e.to_string()))?;

        info!("Successfully created profile with id={}", profile.user_id);
        Ok(profile)
    }

    /// Apply an update document to an already loaded profile and persist it.
    ///
    /// `lastLogin` ends up as the time of this update even when the document
    /// carried its own value.
    #[instrument(
        name = "user_profiles.service.update_profile",
        skip(self, current, doc),
        fields(user_id = %current.user_id)
    )]
    pub async fn update_profile(
        &self,
        mut current: UserProfile,
        doc: Map<String, Value>,
    ) -> Result<UserProfile, ProfileError> {
        info!("Updating profile");

        apply_document(&mut current, doc);
        current.last_login = Some(Utc::now());

        self.repo
            .upsert(current.clone())
            .await
            .map_err(|e| ProfileError::storage(e.to_string()))?;

        info!("Successfully updated profile");
        Ok(current)
    }

    /// Insert the demo user unless it is already there. Returns whether it was inserted.
    #[instrument(name = "user_profiles.service.seed_demo_user", skip(self))]
    pub async fn seed_demo_user(&self) -> Result<bool, ProfileError> {
        let demo = seed::demo_profile();
        if self.exists(demo.user_id).await? {
            info!("User {} already exists, skipping seed", demo.user_id);
            return Ok(false);
        }
        let id = demo.user_id;
        self.repo
            .upsert(demo)
            .await
            .map_err(|e| ProfileError::storage(e.to_string()))?;
        info!("Seeded demo user {}", id);
        Ok(true)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, ProfileError> {
        let found = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| ProfileError::storage(e.to_string()))?;
        Ok(found.is_some())
    }
}

fn take_required_string(doc: &mut Map<String, Value>, key: &str) -> Result<String, ProfileError> {
    match doc.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ProfileError::bad_request(format!("{key} must be a string"))),
        None => Err(ProfileError::bad_request(format!("{key} is required"))),
    }
}

use std::sync::Arc;

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::{UniqueField, UsersRepository};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Domain service with business rules for user management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_username_length: usize,
    pub max_email_length: usize,
    pub max_text_length: usize,
    pub default_list_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_username_length: 100,
            max_email_length: 255,
            max_text_length: 255,
            default_list_limit: 100,
        }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.load(id).await
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(
        &self,
        skip: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<User>, DomainError> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(self.config.default_list_limit);

        let users = self
            .repo
            .list(skip, limit)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!("Listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, new_user),
        fields(username = %new_user.username, email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validate_new_user(&new_user)?;

        if self.exists(UniqueField::Username, &new_user.username).await? {
            return Err(DomainError::username_already_exists(new_user.username));
        }
        if self.exists(UniqueField::Email, &new_user.email).await? {
            return Err(DomainError::email_already_exists(new_user.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            full_name: new_user.full_name,
            department: new_user.department,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .repo
            .insert(user)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "users_info.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        self.validate_user_patch(&patch)?;

        let mut current = self.load(id).await?;

        if let Some(ref username) = patch.username {
            if username != &current.username && self.exists(UniqueField::Username, username).await?
            {
                return Err(DomainError::username_already_exists(username.clone()));
            }
        }
        if let Some(ref email) = patch.email {
            if email != &current.email && self.exists(UniqueField::Email, email).await? {
                return Err(DomainError::email_already_exists(email.clone()));
            }
        }

        if let Some(username) = patch.username {
            current.username = username;
        }
        if let Some(email) = patch.email {
            current.email = email;
        }
        if let Some(full_name) = patch.full_name {
            current.full_name = full_name;
        }
        if let Some(department) = patch.department {
            current.department = department;
        }
        current.updated_at = Utc::now();

        let updated = self
            .repo
            .update(current)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully updated user");
        Ok(updated)
    }

    #[instrument(name = "users_info.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }

    // --- repository helpers ---

    async fn load(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn exists(&self, field: UniqueField, value: &str) -> Result<bool, DomainError> {
        let found = self
            .repo
            .find_by(field, value)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(found.is_some())
    }

    // --- validation helpers ---

    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        self.validate_username(&new_user.username)?;
        self.validate_email(&new_user.email)?;
        self.validate_optional_text("full_name", new_user.full_name.as_deref())?;
        self.validate_optional_text("department", new_user.department.as_deref())?;
        Ok(())
    }

    fn validate_user_patch(&self, patch: &UserPatch) -> Result<(), DomainError> {
        if let Some(ref username) = patch.username {
            self.validate_username(username)?;
        }
        if let Some(ref email) = patch.email {
            self.validate_email(email)?;
        }
        if let Some(ref full_name) = patch.full_name {
            self.validate_optional_text("full_name", full_name.as_deref())?;
        }
        if let Some(ref department) = patch.department {
            self.validate_optional_text("department", department.as_deref())?;
        }
        Ok(())
    }

    fn validate_username(&self, username: &str) -> Result<(), DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::validation("username", "must not be empty"));
        }
        check_length("username", username, self.config.max_username_length)
    }

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        if !is_email_shaped(email) {
            return Err(DomainError::invalid_email(email));
        }
        check_length("email", email, self.config.max_email_length)
    }

    fn validate_optional_text(&self, field: &str, value: Option<&str>) -> Result<(), DomainError> {
        match value {
            Some(v) => check_length(field, v, self.config.max_text_length),
            None => Ok(()),
        }
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}

/// Non-empty local part, an `@`, and a domain with a `.` that is neither first nor last.
fn is_email_shaped(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, _)| !head.is_empty())
        && !domain.ends_with('.')
}

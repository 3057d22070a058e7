use std::sync::Arc;

use modkit::api::OpenApiRegistry;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::config::UserProfilesConfig;
use crate::domain::repo::ProfilesRepository;
use crate::domain::service::Service;
use crate::infra::storage::{InMemoryProfilesRepository, SeaOrmProfilesRepository};

/// Blob-form users module.
#[derive(Clone)]
pub struct UserProfiles {
    service: Arc<Service>,
    config: UserProfilesConfig,
}

impl UserProfiles {
    pub const NAME: &'static str = "user_profiles";

    pub fn with_repo(repo: Arc<dyn ProfilesRepository>, config: UserProfilesConfig) -> Self {
        Self {
            service: Arc::new(Service::new(repo)),
            config,
        }
    }

    pub fn in_memory(config: UserProfilesConfig) -> Self {
        info!("user_profiles: using in-memory store");
        Self::with_repo(Arc::new(InMemoryProfilesRepository::new()), config)
    }

    pub fn persisted(conn: DatabaseConnection, config: UserProfilesConfig) -> Self {
        info!("user_profiles: using database store");
        Self::with_repo(Arc::new(SeaOrmProfilesRepository::new(conn)), config)
    }

    /// Create the `user_profiles` table when it does not exist yet.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running user_profiles database migrations");
        crate::infra::storage::migrations::Migrator::up(conn, None).await?;
        info!("user_profiles database migrations completed");
        Ok(())
    }

    /// Start-up hook: seeds the demo user when configured to.
    pub async fn start(&self) -> anyhow::Result<()> {
        if self.config.seed_demo_user {
            self.seed_demo_user().await?;
        }
        Ok(())
    }

    /// Returns whether the demo user was inserted.
    pub async fn seed_demo_user(&self) -> anyhow::Result<bool> {
        Ok(self.service.seed_demo_user().await?)
    }

    pub fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering user_profiles REST routes");
        let router = routes::register_routes(router, openapi, self.service.clone())?;
        info!("user_profiles REST routes registered");
        Ok(router)
    }
}

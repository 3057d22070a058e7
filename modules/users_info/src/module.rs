use std::sync::Arc;

use modkit::api::OpenApiRegistry;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::repo::UsersRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::storage::{InMemoryUsersRepository, SeaOrmUsersRepository};

/// Typed users module: owns the domain service and exposes it over REST
/// and as an in-process client.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
}

impl UsersInfo {
    pub const NAME: &'static str = "users_info";

    /// Wire the module on top of any repository implementation.
    pub fn with_repo(repo: Arc<dyn UsersRepository>, cfg: &UsersInfoConfig) -> Self {
        debug!(
            "users_info config: default_list_limit={}",
            cfg.default_list_limit
        );
        let service_config = ServiceConfig {
            default_list_limit: cfg.default_list_limit,
            ..ServiceConfig::default()
        };
        Self {
            service: Arc::new(Service::new(repo, service_config)),
        }
    }

    /// Process-local store; contents are lost on restart.
    pub fn in_memory(cfg: &UsersInfoConfig) -> Self {
        info!("users_info: using in-memory store");
        Self::with_repo(Arc::new(InMemoryUsersRepository::new()), cfg)
    }

    /// SeaORM-backed store on the `users` table.
    pub fn persisted(conn: DatabaseConnection, cfg: &UsersInfoConfig) -> Self {
        info!("users_info: using database store");
        Self::with_repo(Arc::new(SeaOrmUsersRepository::new(conn)), cfg)
    }

    /// Create the `users` table when it does not exist yet.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        crate::infra::storage::migrations::Migrator::up(conn, None).await?;
        info!("users_info database migrations completed");
        Ok(())
    }

    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        Arc::new(UsersInfoLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering users_info REST routes");
        let router = routes::register_routes(router, openapi, self.service.clone())?;
        info!("users_info REST routes registered");
        Ok(router)
    }
}

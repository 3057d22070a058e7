//! Process-level plumbing shared by the server binary and the modules:
//! layered configuration, logging setup, home directory resolution and
//! shutdown signal handling.

pub mod config;
pub mod home_dir;
pub mod logging;
pub mod shutdown;

pub use config::{
    default_logging_config, module_config, AppConfig, CliArgs, ConfigProvider, DatabaseConfig,
    LoggingConfig, Section, ServerConfig,
};

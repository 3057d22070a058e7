use anyhow::{bail, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit_db::{absolutize_sqlite_dsn, ConnectOpts, DbEngine, DbHandle};
use runtime::{module_config, AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use user_profiles::config::UserProfilesConfig;
use user_profiles::UserProfiles;
use users_info::config::UsersInfoConfig;
use users_info::UsersInfo;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Users Server - typed user records and free-form user profiles over REST
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - typed user records and free-form user profiles over REST")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use in-memory stores, ignoring the database section
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Create database tables on the configured database
    InitDb {
        /// Also insert the demo user profile when it is missing
        #[arg(long)]
        seed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Users Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::InitDb { seed } => init_db(config, seed).await,
    }
}

/// Typed module configurations, read up front so bad sections fail fast.
struct ModuleConfigs {
    api_ingress: ApiIngressConfig,
    users_info: UsersInfoConfig,
    user_profiles: UserProfilesConfig,
}

impl ModuleConfigs {
    fn from_app(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            api_ingress: module_config(config, "api_ingress")?,
            users_info: module_config(config, UsersInfo::NAME)?,
            user_profiles: module_config(config, UserProfiles::NAME)?,
        })
    }
}

async fn connect_database(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DbHandle> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }

    let engine = DbHandle::detect(raw)?;
    // Relative sqlite paths live under the service home directory
    let dsn = match engine {
        DbEngine::Sqlite => absolutize_sqlite_dsn(raw, base_dir)?,
        DbEngine::Postgres => raw.to_string(),
    };

    let defaults = ConnectOpts::default();
    let opts = ConnectOpts {
        max_conns: db_config.max_conns.or(defaults.max_conns),
        busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
            .or(defaults.busy_timeout),
        ..defaults
    };

    tracing::info!(engine = ?engine, "Connecting to database");
    DbHandle::connect(&dsn, opts)
        .await
        .with_context(|| format!("Failed to connect to database ({engine:?})"))
}

async fn migrate_all(conn: &sea_orm::DatabaseConnection) -> Result<()> {
    UsersInfo::migrate(conn).await?;
    UserProfiles::migrate(conn).await?;
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let module_cfg = ModuleConfigs::from_app(&config)?;
    let base_dir = PathBuf::from(&config.server.home_dir);

    let db = match &config.database {
        Some(db_config) => Some(connect_database(db_config, &base_dir).await?),
        None => {
            tracing::warn!("No database configuration found, using in-memory stores");
            None
        }
    };

    let (users_info, user_profiles) = match &db {
        Some(db) => {
            let conn = db.sea();
            migrate_all(&conn).await?;
            (
                UsersInfo::persisted(conn.clone(), &module_cfg.users_info),
                UserProfiles::persisted(conn, module_cfg.user_profiles.clone()),
            )
        }
        None => (
            UsersInfo::in_memory(&module_cfg.users_info),
            UserProfiles::in_memory(module_cfg.user_profiles.clone()),
        ),
    };

    user_profiles.start().await?;

    let mut ingress = ApiIngress::new(module_cfg.api_ingress);
    if config.server.timeout_sec > 0 {
        ingress = ingress.with_request_timeout(Duration::from_secs(config.server.timeout_sec));
    }

    let router = users_info.register_rest(axum::Router::new(), &ingress)?;
    let router = user_profiles.register_rest(router, &ingress)?;
    let router = ingress.build_router(router)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind address {addr}"))?;

    ApiIngress::serve(listener, router, runtime::shutdown::shutdown_signal()).await?;

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("Users Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    ModuleConfigs::from_app(&config)?;
    if let Some(db) = &config.database {
        DbHandle::detect(db.url.trim())?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn init_db(config: AppConfig, seed: bool) -> Result<()> {
    let Some(db_config) = config.database.as_ref() else {
        bail!("init-db needs a database section in the configuration (and no --mock)");
    };
    let module_cfg = ModuleConfigs::from_app(&config)?;

    let db = connect_database(db_config, Path::new(&config.server.home_dir)).await?;
    let conn = db.sea();
    migrate_all(&conn).await?;
    println!("Database tables created");

    if seed {
        let profiles = UserProfiles::persisted(conn, module_cfg.user_profiles);
        if profiles.seed_demo_user().await? {
            println!("Demo user inserted");
        } else {
            println!("Demo user already present");
        }
    }

    db.close().await;
    Ok(())
}

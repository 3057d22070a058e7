//! Database connection handle shared by the persisted repositories.
//!
//! A [`DbHandle`] owns one sqlx pool (SQLite or Postgres, picked from the DSN
//! scheme) and a SeaORM [`DatabaseConnection`] built on top of the same pool.
//!
//! ```rust,ignore
//! let db = DbHandle::connect("sqlite:///var/lib/users/users.db", ConnectOpts::default()).await?;
//! let conn = db.sea();
//! ```

use std::str::FromStr;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use thiserror::Error;

pub mod sqlite;

pub use sqlite::{absolutize_sqlite_dsn, is_memory_dsn};

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Invalid SQLite DSN: {0}")]
    InvalidSqliteDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each engine applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// SQLite only; ignored for in-memory databases.
    pub busy_timeout: Option<Duration>,
    /// SQLite only: create the database file when it does not exist yet.
    pub create_if_missing: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            acquire_timeout: Some(Duration::from_secs(30)),
            busy_timeout: Some(Duration::from_millis(5000)),
            create_if_missing: true,
        }
    }
}

#[derive(Clone, Debug)]
enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect the engine from the DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        let (pool, sea) = match engine {
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                let pool = o.connect(dsn).await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                (DbPool::Postgres(pool), sea)
            }
            DbEngine::Sqlite => {
                let pool = connect_sqlite(dsn, &opts).await?;
                let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                (DbPool::Sqlite(pool), sea)
            }
        };

        tracing::info!(engine = ?engine, "database pool ready");
        Ok(Self {
            engine,
            pool,
            dsn: dsn.to_string(),
            sea,
        })
    }

    /// Graceful pool close. Dropping the handle also closes it.
    pub async fn close(self) {
        match self.pool {
            DbPool::Postgres(p) => p.close().await,
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// SeaORM connection (cheap clone of the pooled handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

async fn connect_sqlite(dsn: &str, opts: &ConnectOpts) -> Result<SqlitePool> {
    let memory = is_memory_dsn(dsn);

    let mut co = SqliteConnectOptions::from_str(dsn)?
        .create_if_missing(opts.create_if_missing)
        .synchronous(SqliteSynchronous::Normal);

    let mut o = SqlitePoolOptions::new();
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }

    if memory {
        // Every connection to `:memory:` is a separate database: keep exactly one alive.
        co = co.journal_mode(SqliteJournalMode::Memory);
        o = o
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        sqlite::ensure_parent_dir(dsn)?;
        co = co.journal_mode(SqliteJournalMode::Wal);
        if let Some(t) = opts.busy_timeout {
            co = co.busy_timeout(t);
        }
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
    }

    Ok(o.connect_with(co).await?)
}

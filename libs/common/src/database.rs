//! SQLite pool setup shared by the services
//!
//! Covers reading the pool settings, opening the pool, applying a schema
//! script and the liveness probe used by `/health`.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{env, str::FromStr, time::Duration};
use tracing::{debug, info, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://movies.db?mode=rwc";

/// Pool settings for the SQLite store
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://movies.db?mode=rwc` or `sqlite::memory:`
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection
    pub connection_timeout: u64,
}

/// Read a numeric variable, falling back when it is unset or unparsable
fn env_number<T: FromStr>(name: &str, fallback: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", name, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}

impl DatabaseConfig {
    /// Read the pool settings from the process environment
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | `sqlite://movies.db?mode=rwc` |
    /// | `DATABASE_MAX_CONNECTIONS` | 5 |
    /// | `DATABASE_MIN_CONNECTIONS` | 1 |
    /// | `DATABASE_CONNECTION_TIMEOUT` | 30 |
    pub fn from_env() -> DatabaseResult<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env_number("DATABASE_MAX_CONNECTIONS", 5),
            min_connections: env_number("DATABASE_MIN_CONNECTIONS", 1),
            connection_timeout: env_number("DATABASE_CONNECTION_TIMEOUT", 30),
        };

        if config.min_connections > config.max_connections {
            return Err(DatabaseError::Configuration(format!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                config.min_connections, config.max_connections
            )));
        }

        Ok(config)
    }

    /// A private in-memory database, used by tests
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout: 5,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Open a SQLite pool for `config`
///
/// An in-memory database lives only as long as its connection, so such pools
/// are pinned to a single connection that is never reaped.
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))?;

    let pool_options =
        SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.connection_timeout));

    let pool_options = if config.is_in_memory() {
        debug!("Pinning in-memory database to a single connection");
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Opened SQLite pool at {}", config.database_url);
    Ok(pool)
}

/// Run a schema script, one statement at a time
pub async fn apply_schema(pool: &SqlitePool, script: &str) -> DatabaseResult<()> {
    let statements = script.split(';').map(str::trim).filter(|s| !s.is_empty());

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    }

    Ok(())
}

/// Whether the store answers a trivial query
///
/// Failures are logged and reported as `false` rather than as an error.
pub async fn health_check(pool: &SqlitePool) -> DatabaseResult<bool> {
    if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
        warn!("SQLite liveness probe failed: {}", e);
        return Ok(false);
    }

    Ok(true)
}

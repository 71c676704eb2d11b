//! Application state shared across handlers

use anyhow::Result;
use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::SqlitePool;
use tracing::info;

use crate::{auth::AuthGate, repositories::MovieRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub movie_repository: MovieRepository,
    pub auth_gate: AuthGate,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, auth_gate: AuthGate) -> Self {
        let movie_repository = MovieRepository::new(db_pool.clone());

        Self {
            db_pool,
            movie_repository,
            auth_gate,
        }
    }

    /// Open the pool, check connectivity and make sure the schema exists
    pub async fn connect(db_config: &DatabaseConfig, auth_gate: AuthGate) -> Result<Self> {
        let pool = init_pool(db_config).await?;

        if health_check(&pool).await? {
            info!("Database connection successful");
        } else {
            anyhow::bail!("Failed to connect to database");
        }

        let state = Self::new(pool, auth_gate);
        state.movie_repository.init_schema().await?;

        Ok(state)
    }
}

//! Errors raised by the shared SQLite layer

use thiserror::Error;

/// Failure opening, probing or querying the store
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("could not open the SQLite pool: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("SQLite statement failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A schema statement was rejected
    #[error("schema setup failed: {0}")]
    Migration(String),

    #[error("invalid database settings: {0}")]
    Configuration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

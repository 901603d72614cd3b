//! Custom error types for the common library
//!
//! This module defines the infrastructure error types shared by the
//! services: one for the PostgreSQL user store and one for the Redis
//! session store.

use redis::RedisError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query error, pulling unique violations out of the generic bucket
    pub fn from_query(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }

        DatabaseError::Query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Custom error type for cache (Redis) operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Could not open the client or obtain a connection
    #[error("Cache connection error: {0}")]
    Connection(#[source] RedisError),

    /// A command was rejected or failed in flight
    #[error("Cache command error: {0}")]
    Command(#[source] RedisError),

    /// A stored value could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;

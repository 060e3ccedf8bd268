//! Custom error types for the common library
//!
//! This module defines infrastructure error types shared by the services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error raised while loading service settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings sources could not be merged or deserialized
    #[error("Settings error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value parsed but is not usable
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

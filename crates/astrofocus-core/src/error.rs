//! Core error types for astrofocus-core.
//!
//! Engine operations never fail hard: invalid input comes back as a
//! [`ValidationError`] with state untouched, and persistence problems are
//! logged and defaulted. The fallible surface is setup (opening the store,
//! loading configuration), which reports through [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for astrofocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected user input. State is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Focus duration missing, non-numeric or out of range
    #[error("Invalid focus duration '{0}': expected a whole number of seconds from 1 to 9223372036854775")]
    InvalidDuration(String),

    /// Rating outside 1..=5
    #[error("Invalid rating {0}: expected a whole number from 1 to 5")]
    InvalidRating(i64),

    /// Rating text that is not a whole number
    #[error("Invalid rating '{0}': expected a whole number from 1 to 5")]
    InvalidRatingText(String),

    /// Required text was blank after trimming
    #[error("{field} must not be empty")]
    EmptyText { field: &'static str },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Core error types for fasting-core.
//!
//! Mutations on the tracker never return these: store failures are contained
//! at the persistence boundary. They surface from explicit store calls,
//! configuration handling and plan validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fasting-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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

/// Errors raised by a [`KvStore`](crate::storage::KvStore) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// A read failed
    #[error("Read of '{key}' failed: {message}")]
    ReadFailed { key: String, message: String },

    /// A write failed
    #[error("Write of '{key}' failed: {message}")]
    WriteFailed { key: String, message: String },

    /// The background writer is gone
    #[error("Persistence writer has shut down")]
    WriterClosed,
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for user-authored input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Plan name is blank after trimming
    #[error("Plan name must not be empty")]
    EmptyName,

    /// Plan name exceeds the allowed length
    #[error("Plan name is {len} characters; at most {max} allowed")]
    NameTooLong { len: usize, max: usize },

    /// Fasting window must be at least one hour
    #[error("Fasting hours must be at least 1")]
    ZeroFastingHours,

    /// Fasting and eating windows must cover exactly one day
    #[error("Fasting hours ({fasting}) and eating hours ({eating}) must add up to 24")]
    HoursNotFullDay { fasting: u32, eating: u32 },

    /// Plan id not present in the catalog
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

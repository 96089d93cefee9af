//! Error types for parcelrange.
//!
//! Allocation-level failures live in [`crate::code::CodeError`]; this module
//! wraps them together with storage, configuration and I/O failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::code::CodeError;

/// The main error type for parcelrange operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Allocation Errors ===
    /// A tracking code or number was rejected.
    #[error(transparent)]
    Code(#[from] CodeError),

    /// Every number in the station's range is already issued.
    #[error("station '{station}' is full: no free tracking numbers left in its range")]
    RangeFull {
        /// Name of the full station.
        station: String,
    },

    /// The tracking code is already held by another package.
    #[error("tracking code {code} is already issued")]
    DuplicateCode {
        /// The colliding tracking code.
        code: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for parcelrange operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error means the station has no free numbers.
    #[must_use]
    pub fn is_range_full(&self) -> bool {
        matches!(self, Self::RangeFull { .. })
    }

    /// Check if this error is a tracking-code collision.
    #[must_use]
    pub fn is_duplicate_code(&self) -> bool {
        matches!(self, Self::DuplicateCode { .. })
    }

    /// Check if this error is a rejected number or code, as opposed to an
    /// infrastructure failure.
    #[must_use]
    pub fn is_code_error(&self) -> bool {
        matches!(self, Self::Code(_))
    }
}

//! Error types for huntsize.

use thiserror::Error;

/// Result type alias for huntsize operations.
pub type Result<T> = std::result::Result<T, HuntsizeError>;

/// Errors that can occur while estimating ingestion volume.
#[derive(Error, Debug)]
pub enum HuntsizeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Acquiring an access token failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An advanced-hunting query failed.
    #[error("Query error: {0}")]
    Query(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report writing error.
    #[error("Format error: {0}")]
    Format(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Core error types for `Musify`.

use thiserror::Error;

/// Core error type for `Musify` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown genre tag.
    #[error("Unknown genre tag: {0}")]
    UnknownGenre(String),

    /// Identifier that cannot be used with the target catalog.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A path does not have the `collection/.../id` shape.
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    /// A field expected to hold an array holds something else.
    #[error("Field {field} of {path} is not an array")]
    NotAnArray {
        /// Document path.
        path: String,
        /// Field name.
        field: String,
    },

    /// Song ids that cannot exist in the catalog.
    #[error("Invalid song ids: {}", .0.join(", "))]
    InvalidSongIds(Vec<String>),

    /// No user is signed in and anonymous sign-in failed.
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::NotSignedIn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_song_ids_message() {
        let err = StoreError::InvalidSongIds(vec!["abc".to_string(), "1x".to_string()]);
        assert_eq!(err.to_string(), "Invalid song ids: abc, 1x");
        assert!(!err.is_transient());
    }
}

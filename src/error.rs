//! Error types for wpsync

use thiserror::Error;

/// Result type alias for wpsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for wpsync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Check if the error should abort the whole sync cycle.
    ///
    /// Decode, timestamp and slug errors are scoped to a single item and are
    /// skipped by the batch loop; everything else means the process cannot
    /// make progress.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SyncError::Decode(_) | SyncError::InvalidTimestamp(_) | SyncError::InvalidSlug(_)
        )
    }
}

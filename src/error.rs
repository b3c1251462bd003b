//! Error types for Fiszki
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::id::ItemId;

/// All error types that can occur in Fiszki
#[derive(Debug, Error)]
pub enum FiszkiError {
    /// Rating submitted for an item that has no review state
    #[error("Review state not found for item {0}")]
    NotFound(ItemId),

    /// Rating value rejected at the boundary
    #[error("Invalid quality rating: {0}")]
    InvalidQuality(i64),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Content generation error (language model, malformed output)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Malformed seed data
    #[error("Seed error: {0}")]
    Seed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FiszkiError {
    /// Whether the error was caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FiszkiError::NotFound(_) | FiszkiError::InvalidQuality(_))
    }
}

/// Result type alias for Fiszki operations
pub type Result<T> = std::result::Result<T, FiszkiError>;

//! Errors local to the cache crate.

use shared_types::StoreError;
use thiserror::Error;

/// Failures opening or preparing a whitelist database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Failed to open whitelist database at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to prepare whitelist schema: {0}")]
    Schema(String),
}

impl From<CacheError> for StoreError {
    fn from(e: CacheError) -> Self {
        StoreError::Database(e.to_string())
    }
}

//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write was attempted but the backend did not persist it.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backing persistence layer reported an error.
    #[error("backend error: {0}")]
    Backend(String),
}

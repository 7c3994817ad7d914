//! Error types for the engine crate.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by dataset synchronization.
///
/// The detection path never returns these; it fails open and reports
/// through the [`EventSink`](crate::EventSink) instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The threat-data API call failed.
    #[error(transparent)]
    Api(#[from] sitesafe_api::ApiError),

    /// The local store rejected a read or write.
    #[error(transparent)]
    Store(#[from] sitesafe_store::StoreError),
}

//! Core type definitions for SiteSafe.
//!
//! This crate defines the fundamental, transport-agnostic types used by the
//! malicious-site detection and dataset synchronization engine:
//! - The two-dimensional dataset key space (threat category × dataset kind)
//! - Hash prefixes and full-hash/regex filters
//! - Revisioned datasets and the incremental diff format
//!
//! Anything that talks to the network or a persistence backend belongs in
//! `sitesafe-api` / `sitesafe-store`, not here.

mod dataset;
mod threat;

pub use dataset::{
    Filter, FilterSet, HashPrefix, HashPrefixSet, RevisionedSet, UpdateDiff, HASH_PREFIX_LEN,
};
pub use threat::{DataType, DatasetKey, ThreatKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid hash prefix: {0:?}")]
    InvalidHashPrefix(String),
}

//! Threat-data API client for SiteSafe.
//!
//! The engine consumes two remote operations through the [`ApiClient`]
//! trait: incremental dataset diffs (one per dataset key, keyed by the
//! client's current revision) and full-hash match lookups for a single hash
//! prefix. [`HttpApiClient`] is the production implementation; its base URL
//! is configurable so tests can point it at a local mock server.
//!
//! Transport failures are classified into the taxonomy the engine's
//! telemetry distinguishes: timeouts are their own [`ApiError`] variant,
//! everything else degrades to network/status/decode errors.

mod error;
mod http;
mod client;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use http::{HttpApiClient, HttpApiClientConfig};

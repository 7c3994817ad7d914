//! Malicious-site detection and dataset synchronization for SiteSafe.
//!
//! Classifies a URL as malicious before the page loads, without leaking the
//! user's browsing history: the local hash-prefix membership test resolves
//! the vast majority of URLs with zero network traffic, and only ambiguous
//! prefix hits ever reach the remote match API.
//!
//! # Architecture
//!
//! - **Detector**: cascading local-first evaluation per threat kind —
//!   hash-prefix membership, then local full-hash filters, then (only when
//!   local data is inconclusive) a remote match lookup. Fails open.
//! - **UpdateManager**: keeps every dataset fresh by applying incremental,
//!   revision-numbered diffs, on independent per-dataset schedules with
//!   cooperative cancellation.
//! - **Seams**: persistence ([`sitesafe_store::DataStore`]), transport
//!   ([`sitesafe_api::ApiClient`]), feature flags ([`ThreatSupport`]),
//!   telemetry ([`EventSink`]), scheduling ([`UpdateIntervalProvider`],
//!   [`Sleeper`]) — all injected at construction, no globals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sitesafe_api::{HttpApiClient, HttpApiClientConfig};
//! use sitesafe_engine::{AllThreats, Detector, NoopEventSink};
//! use sitesafe_store::MemoryDataStore;
//!
//! let store = Arc::new(MemoryDataStore::new());
//! let api = Arc::new(HttpApiClient::new(HttpApiClientConfig::default()));
//! let detector = Detector::new(store, api, Arc::new(AllThreats), Arc::new(NoopEventSink));
//! ```

pub mod canonical;
mod detector;
mod error;
mod events;
mod schedule;
mod support;
mod update;

pub use detector::{Detector, CLIENT_SIDE_HIT_MIN_LOCAL_FILTERS};
pub use error::{EngineError, EngineResult};
pub use events::{EventSink, NoopEventSink, TelemetryEvent};
pub use schedule::{FixedIntervals, Sleeper, TokioSleeper, UpdateIntervalProvider};
pub use support::{AllThreats, ThreatSupport};
pub use update::{PeriodicUpdateHandle, UpdateManager};

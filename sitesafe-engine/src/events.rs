//! Telemetry events emitted by the detection and update paths.

use serde::{Deserialize, Serialize};
use sitesafe_types::{DataType, ThreatKind};

/// Something notable happened inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TelemetryEvent {
    /// A URL was classified as a threat and the caller will block it.
    #[serde(rename_all = "camelCase")]
    ErrorPageShown {
        threat: ThreatKind,
        /// Whether the verdict came from local data alone. `None` when the
        /// local filter population is too small to report this without
        /// narrowing down the user's browsing.
        client_side_hit: Option<bool>,
    },

    /// The remote match lookup failed for a reason other than a timeout.
    MatchesApiFailure { error: String },

    /// The remote match lookup timed out.
    MatchesApiTimeout,

    /// A dataset that has never been populated failed its first sync.
    #[serde(rename_all = "camelCase")]
    FailedToDownloadInitialDataSets {
        threat: ThreatKind,
        data_type: DataType,
    },
}

/// Receives engine telemetry. Implementations must be cheap; events are
/// emitted inline on the detection path.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: TelemetryEvent) {}
}

//! Feature gating for threat kinds.

use sitesafe_types::ThreatKind;
use std::collections::HashSet;

/// Decides which threat kinds are currently enabled.
///
/// Queried fresh on every evaluation and every sync round, never cached, so
/// a flag flip takes effect without restarting the engine.
pub trait ThreatSupport: Send + Sync {
    fn supported_threats(&self) -> HashSet<ThreatKind>;
}

/// Enables every threat kind unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllThreats;

impl ThreatSupport for AllThreats {
    fn supported_threats(&self) -> HashSet<ThreatKind> {
        ThreatKind::ALL.into_iter().collect()
    }
}

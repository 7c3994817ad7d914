//! The two-dimensional key space of threat datasets.
//!
//! Every dataset is addressed by a [`DatasetKey`]: a threat category crossed
//! with a dataset kind. Keys are the unit of storage, revisioning and
//! synchronization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of malicious site.
///
/// The declared order is the evaluation order: detection checks phishing
/// first, then malware, then scam, short-circuiting on the first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThreatKind {
    Phishing,
    Malware,
    Scam,
}

impl ThreatKind {
    /// All threat kinds, in evaluation order.
    pub const ALL: [ThreatKind; 3] = [
        ThreatKind::Phishing,
        ThreatKind::Malware,
        ThreatKind::Scam,
    ];

    /// Stable lowercase name, used in API paths and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ThreatKind::Phishing => "phishing",
            ThreatKind::Malware => "malware",
            ThreatKind::Scam => "scam",
        }
    }
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of dataset stored for a threat category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// Set of 8-hex-character SHA-256 digest prefixes (the local membership
    /// test consulted on every navigation).
    HashPrefixSet,
    /// Set of full-hash/regex filters that confirm or refute a prefix hit.
    FilterSet,
}

impl DataType {
    /// All dataset kinds.
    pub const ALL: [DataType; 2] = [DataType::HashPrefixSet, DataType::FilterSet];

    /// Stable name, used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataType::HashPrefixSet => "hashPrefixSet",
            DataType::FilterSet => "filterSet",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses one dataset: a dataset kind for a threat category.
///
/// The unit of storage, revisioning and synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub data_type: DataType,
    pub threat: ThreatKind,
}

impl DatasetKey {
    /// Creates a dataset key.
    #[must_use]
    pub const fn new(data_type: DataType, threat: ThreatKind) -> Self {
        Self { data_type, threat }
    }

    /// The full cross product of dataset kinds and threat kinds, hash-prefix
    /// sets first, threats in evaluation order.
    pub fn all() -> impl Iterator<Item = DatasetKey> {
        DataType::ALL.into_iter().flat_map(|data_type| {
            ThreatKind::ALL
                .into_iter()
                .map(move |threat| DatasetKey::new(data_type, threat))
        })
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.data_type, self.threat)
    }
}

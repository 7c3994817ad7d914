//! Update cadence and time abstractions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesafe_types::{DataType, DatasetKey};
use std::time::Duration;

/// Decides how often each dataset is refreshed.
///
/// Returning `None` permanently excludes the dataset from periodic updates;
/// it can still be synced on demand.
pub trait UpdateIntervalProvider: Send + Sync {
    fn interval(&self, key: DatasetKey) -> Option<Duration>;
}

/// One fixed interval per data type, shared by every threat kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedIntervals {
    /// Refresh cadence for hash-prefix sets.
    pub hash_prefix_sets: Option<Duration>,
    /// Refresh cadence for filter sets.
    pub filter_sets: Option<Duration>,
}

impl Default for FixedIntervals {
    /// Hash prefixes every 20 minutes, filters every 12 hours. Prefix sets
    /// are small and gate the whole cascade, so they turn over much faster.
    fn default() -> Self {
        Self {
            hash_prefix_sets: Some(Duration::from_secs(20 * 60)),
            filter_sets: Some(Duration::from_secs(12 * 60 * 60)),
        }
    }
}

impl UpdateIntervalProvider for FixedIntervals {
    fn interval(&self, key: DatasetKey) -> Option<Duration> {
        match key.data_type {
            DataType::HashPrefixSet => self.hash_prefix_sets,
            DataType::FilterSet => self.filter_sets,
        }
    }
}

/// Async sleep, injectable so tests can drive the periodic loops manually.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

//! The `DataStore` trait.

use crate::StoreResult;
use async_trait::async_trait;
use sitesafe_types::{DataType, DatasetKey, FilterSet, HashPrefixSet, ThreatKind};
use std::time::SystemTime;
use tokio::sync::broadcast;

/// Persists and retrieves one revisioned dataset per [`DatasetKey`].
///
/// Implementations must be safe under concurrent access: the detector reads
/// while the update manager writes, and independent update loops write to
/// distinct keys concurrently. No key's mutation may require a lock spanning
/// another key.
///
/// Loading a key that has never been written yields the empty revision-0
/// dataset.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Loads the hash-prefix dataset for a threat kind.
    async fn hash_prefix_set(&self, threat: ThreatKind) -> StoreResult<HashPrefixSet>;

    /// Loads the filter dataset for a threat kind.
    async fn filter_set(&self, threat: ThreatKind) -> StoreResult<FilterSet>;

    /// Persists the hash-prefix dataset for a threat kind.
    async fn put_hash_prefix_set(&self, threat: ThreatKind, set: HashPrefixSet)
        -> StoreResult<()>;

    /// Persists the filter dataset for a threat kind.
    async fn put_filter_set(&self, threat: ThreatKind, set: FilterSet) -> StoreResult<()>;

    /// When a dataset of this kind was last successfully persisted, if ever.
    async fn last_update(&self, data_type: DataType) -> StoreResult<Option<SystemTime>>;

    /// Records a successful persisted update for a dataset kind.
    async fn set_last_update(&self, data_type: DataType, at: SystemTime) -> StoreResult<()>;

    /// Subscribes to dataset changes. A key is broadcast after each
    /// successful `put_*` for it.
    fn subscribe(&self) -> broadcast::Receiver<DatasetKey>;
}

//! In-memory `DataStore` implementation.

use crate::{DataStore, StoreResult};
use async_trait::async_trait;
use sitesafe_types::{DataType, DatasetKey, FilterSet, HashPrefixSet, ThreatKind};
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Keeps all datasets in memory behind per-map read/write locks.
///
/// Reference implementation of [`DataStore`]; suitable for tests and for
/// hosts that rehydrate datasets through some other channel.
pub struct MemoryDataStore {
    hash_prefix_sets: RwLock<HashMap<ThreatKind, HashPrefixSet>>,
    filter_sets: RwLock<HashMap<ThreatKind, FilterSet>>,
    last_updates: RwLock<HashMap<DataType, SystemTime>>,
    changes: broadcast::Sender<DatasetKey>,
}

impl MemoryDataStore {
    /// Creates an empty store: every dataset at revision 0 with no items.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            hash_prefix_sets: RwLock::new(HashMap::new()),
            filter_sets: RwLock::new(HashMap::new()),
            last_updates: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn notify(&self, key: DatasetKey) {
        // Nobody listening is fine; send only fails with zero receivers.
        if self.changes.send(key).is_ok() {
            debug!("dataset changed: {key}");
        }
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn hash_prefix_set(&self, threat: ThreatKind) -> StoreResult<HashPrefixSet> {
        let sets = self.hash_prefix_sets.read().await;
        Ok(sets.get(&threat).cloned().unwrap_or_default())
    }

    async fn filter_set(&self, threat: ThreatKind) -> StoreResult<FilterSet> {
        let sets = self.filter_sets.read().await;
        Ok(sets.get(&threat).cloned().unwrap_or_default())
    }

    async fn put_hash_prefix_set(
        &self,
        threat: ThreatKind,
        set: HashPrefixSet,
    ) -> StoreResult<()> {
        self.hash_prefix_sets.write().await.insert(threat, set);
        self.notify(DatasetKey::new(DataType::HashPrefixSet, threat));
        Ok(())
    }

    async fn put_filter_set(&self, threat: ThreatKind, set: FilterSet) -> StoreResult<()> {
        self.filter_sets.write().await.insert(threat, set);
        self.notify(DatasetKey::new(DataType::FilterSet, threat));
        Ok(())
    }

    async fn last_update(&self, data_type: DataType) -> StoreResult<Option<SystemTime>> {
        Ok(self.last_updates.read().await.get(&data_type).copied())
    }

    async fn set_last_update(&self, data_type: DataType, at: SystemTime) -> StoreResult<()> {
        self.last_updates.write().await.insert(data_type, at);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<DatasetKey> {
        self.changes.subscribe()
    }
}

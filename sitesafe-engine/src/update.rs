//! Dataset synchronization and periodic scheduling.

use crate::error::{EngineError, EngineResult};
use crate::events::{EventSink, TelemetryEvent};
use crate::schedule::{Sleeper, TokioSleeper, UpdateIntervalProvider};
use crate::support::ThreatSupport;
use sitesafe_api::ApiClient;
use sitesafe_store::DataStore;
use sitesafe_types::{DataType, DatasetKey, ThreatKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A sync attempt that did not complete, together with whether the dataset
/// had ever been populated before the attempt. First-sync failures are
/// reported to telemetry; routine refresh failures are not.
struct SyncFailure {
    error: EngineError,
    dataset_was_unpopulated: bool,
}

/// Keeps the local threat datasets in step with the server by applying
/// incremental, revision-numbered diffs.
///
/// At most one update per dataset runs at a time; concurrent callers for
/// the same dataset queue on a per-dataset lock. Different datasets update
/// independently.
pub struct UpdateManager {
    store: Arc<dyn DataStore>,
    api: Arc<dyn ApiClient>,
    support: Arc<dyn ThreatSupport>,
    events: Arc<dyn EventSink>,
    intervals: Arc<dyn UpdateIntervalProvider>,
    sleeper: Arc<dyn Sleeper>,
    key_locks: HashMap<DatasetKey, Mutex<()>>,
}

impl UpdateManager {
    /// Creates an update manager that sleeps on the tokio timer.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        api: Arc<dyn ApiClient>,
        support: Arc<dyn ThreatSupport>,
        events: Arc<dyn EventSink>,
        intervals: Arc<dyn UpdateIntervalProvider>,
    ) -> Self {
        Self::with_sleeper(store, api, support, events, intervals, Arc::new(TokioSleeper))
    }

    /// Creates an update manager with an injected [`Sleeper`].
    #[must_use]
    pub fn with_sleeper(
        store: Arc<dyn DataStore>,
        api: Arc<dyn ApiClient>,
        support: Arc<dyn ThreatSupport>,
        events: Arc<dyn EventSink>,
        intervals: Arc<dyn UpdateIntervalProvider>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let key_locks = DatasetKey::all().map(|key| (key, Mutex::new(()))).collect();
        Self {
            store,
            api,
            support,
            events,
            intervals,
            sleeper,
            key_locks,
        }
    }

    /// Brings one dataset up to the server's current revision.
    ///
    /// A no-op when the dataset's threat kind is not currently supported.
    /// On failure the stored dataset and its freshness timestamp are left
    /// untouched.
    pub async fn update_dataset(&self, key: DatasetKey) -> EngineResult<()> {
        if !self.support.supported_threats().contains(&key.threat) {
            debug!("skipping update of {key}: threat kind not supported");
            return Ok(());
        }

        let _serialized = self.key_locks[&key].lock().await;

        let outcome = match key.data_type {
            DataType::HashPrefixSet => self.sync_hash_prefixes(key.threat).await,
            DataType::FilterSet => self.sync_filters(key.threat).await,
        };

        match outcome {
            Ok(()) => {
                debug!("updated {key}");
                Ok(())
            }
            Err(failure) => {
                if failure.dataset_was_unpopulated {
                    warn!("initial download of {key} failed: {}", failure.error);
                    self.events.emit(TelemetryEvent::FailedToDownloadInitialDataSets {
                        threat: key.threat,
                        data_type: key.data_type,
                    });
                } else {
                    debug!("refresh of {key} failed: {}", failure.error);
                }
                Err(failure.error)
            }
        }
    }

    /// Updates the datasets of `data_type` for every supported threat kind.
    ///
    /// Every dataset is attempted even when an earlier one fails; the first
    /// error is returned once all attempts have run.
    pub async fn update_all(&self, data_type: DataType) -> EngineResult<()> {
        let supported = self.support.supported_threats();
        let mut first_error: Option<EngineError> = None;

        for threat in ThreatKind::ALL {
            if !supported.contains(&threat) {
                continue;
            }
            if let Err(err) = self.update_dataset(DatasetKey::new(data_type, threat)).await {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// When datasets of `data_type` last completed a successful sync.
    /// `None` when no sync has ever succeeded or the store cannot answer.
    pub async fn last_update(&self, data_type: DataType) -> Option<SystemTime> {
        self.store.last_update(data_type).await.ok().flatten()
    }

    /// Spawns one refresh loop per dataset with a configured interval.
    ///
    /// Each loop syncs immediately, then again after every interval, and
    /// stops at its next suspension point once the handle is cancelled or
    /// dropped.
    pub fn start_periodic_updates(self: &Arc<Self>) -> PeriodicUpdateHandle {
        let (cancel, cancelled) = watch::channel(false);
        let mut tasks = Vec::new();

        for key in DatasetKey::all() {
            let Some(interval) = self.intervals.interval(key) else {
                debug!("no interval configured for {key}, not scheduling");
                continue;
            };
            let manager = Arc::clone(self);
            let mut cancelled = cancelled.clone();
            tasks.push(tokio::spawn(async move {
                info!("starting periodic updates of {key} every {interval:?}");
                loop {
                    if *cancelled.borrow() {
                        break;
                    }
                    if let Err(err) = manager.update_dataset(key).await {
                        warn!("periodic update of {key} failed: {err}");
                    }
                    tokio::select! {
                        () = manager.sleeper.sleep(interval) => {}
                        _ = cancelled.changed() => break,
                    }
                }
                debug!("periodic updates of {key} stopped");
            }));
        }

        PeriodicUpdateHandle { cancel, tasks }
    }

    async fn sync_hash_prefixes(&self, threat: ThreatKind) -> Result<(), SyncFailure> {
        let current = self
            .store
            .hash_prefix_set(threat)
            .await
            .map_err(|err| SyncFailure {
                error: err.into(),
                dataset_was_unpopulated: true,
            })?;
        let was_unpopulated = current.is_unpopulated();
        let fail = |error: EngineError| SyncFailure {
            error,
            dataset_was_unpopulated: was_unpopulated,
        };

        let diff = self
            .api
            .hash_prefix_diff(threat, current.revision)
            .await
            .map_err(|err| fail(err.into()))?;
        let updated = current.apply(&diff);
        self.store
            .put_hash_prefix_set(threat, updated)
            .await
            .map_err(|err| fail(err.into()))?;
        self.store
            .set_last_update(DataType::HashPrefixSet, SystemTime::now())
            .await
            .map_err(|err| fail(err.into()))
    }

    async fn sync_filters(&self, threat: ThreatKind) -> Result<(), SyncFailure> {
        let current = self
            .store
            .filter_set(threat)
            .await
            .map_err(|err| SyncFailure {
                error: err.into(),
                dataset_was_unpopulated: true,
            })?;
        let was_unpopulated = current.is_unpopulated();
        let fail = |error: EngineError| SyncFailure {
            error,
            dataset_was_unpopulated: was_unpopulated,
        };

        let diff = self
            .api
            .filter_diff(threat, current.revision)
            .await
            .map_err(|err| fail(err.into()))?;
        let updated = current.apply(&diff);
        self.store
            .put_filter_set(threat, updated)
            .await
            .map_err(|err| fail(err.into()))?;
        self.store
            .set_last_update(DataType::FilterSet, SystemTime::now())
            .await
            .map_err(|err| fail(err.into()))
    }
}

/// Handle over the periodic refresh loops. Dropping it stops every loop at
/// its next suspension point.
pub struct PeriodicUpdateHandle {
    cancel: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PeriodicUpdateHandle {
    /// Signals every loop to stop without waiting for them.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Signals every loop to stop and waits until they have.
    pub async fn shutdown(self) {
        self.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }

    /// Number of refresh loops that were scheduled.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.tasks.len()
    }
}

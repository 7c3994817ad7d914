use async_trait::async_trait;
use sitesafe_api::{ApiClient, ApiError, ApiResult};
use sitesafe_engine::{
    AllThreats, EventSink, FixedIntervals, TelemetryEvent, ThreatSupport, UpdateManager,
};
use sitesafe_store::{DataStore, MemoryDataStore};
use sitesafe_types::{
    DataType, DatasetKey, Filter, HashPrefix, HashPrefixSet, ThreatKind, UpdateDiff,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedApi {
    prefix_diffs: Mutex<HashMap<ThreatKind, UpdateDiff<HashPrefix>>>,
    filter_diffs: Mutex<HashMap<ThreatKind, UpdateDiff<Filter>>>,
    failing: Mutex<HashSet<ThreatKind>>,
    prefix_calls: AtomicUsize,
    requested_revisions: Mutex<Vec<u64>>,
}

impl ScriptedApi {
    fn script_prefix_diff(&self, threat: ThreatKind, diff: UpdateDiff<HashPrefix>) {
        self.prefix_diffs.lock().unwrap().insert(threat, diff);
    }

    fn script_filter_diff(&self, threat: ThreatKind, diff: UpdateDiff<Filter>) {
        self.filter_diffs.lock().unwrap().insert(threat, diff);
    }

    fn fail_for(&self, threat: ThreatKind) {
        self.failing.lock().unwrap().insert(threat);
    }

    fn prefix_calls(&self) -> usize {
        self.prefix_calls.load(Ordering::SeqCst)
    }

    fn requested_revisions(&self) -> Vec<u64> {
        self.requested_revisions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn hash_prefix_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<HashPrefix>> {
        self.prefix_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_revisions.lock().unwrap().push(from_revision);
        if self.failing.lock().unwrap().contains(&threat) {
            return Err(ApiError::Status(500));
        }
        Ok(self
            .prefix_diffs
            .lock()
            .unwrap()
            .get(&threat)
            .cloned()
            .unwrap_or_else(|| UpdateDiff::incremental(from_revision, [], [])))
    }

    async fn filter_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<Filter>> {
        self.requested_revisions.lock().unwrap().push(from_revision);
        if self.failing.lock().unwrap().contains(&threat) {
            return Err(ApiError::Status(500));
        }
        Ok(self
            .filter_diffs
            .lock()
            .unwrap()
            .get(&threat)
            .cloned()
            .unwrap_or_else(|| UpdateDiff::incremental(from_revision, [], [])))
    }

    async fn matches_for_prefix(&self, _prefix: &HashPrefix) -> ApiResult<HashSet<Filter>> {
        unreachable!("updates never query the matches endpoint")
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl CollectingSink {
    fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Supported(HashSet<ThreatKind>);

impl ThreatSupport for Supported {
    fn supported_threats(&self) -> HashSet<ThreatKind> {
        self.0.clone()
    }
}

fn prefix(s: &str) -> HashPrefix {
    HashPrefix::new(s).unwrap()
}

fn manager(
    store: &Arc<MemoryDataStore>,
    api: &Arc<ScriptedApi>,
    sink: &Arc<CollectingSink>,
) -> UpdateManager {
    UpdateManager::new(
        store.clone(),
        api.clone(),
        Arc::new(AllThreats),
        sink.clone(),
        Arc::new(FixedIntervals::default()),
    )
}

const PHISHING_PREFIXES: DatasetKey = DatasetKey::new(DataType::HashPrefixSet, ThreatKind::Phishing);

// ── Syncing ──────────────────────────────────────────────────────

#[tokio::test]
async fn initial_seed_lands_on_server_revision() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    api.script_prefix_diff(
        ThreatKind::Phishing,
        UpdateDiff::replacement(5, [prefix("a379a6f6"), prefix("255a8a79")]),
    );

    manager(&store, &api, &sink)
        .update_dataset(PHISHING_PREFIXES)
        .await
        .unwrap();

    let set = store.hash_prefix_set(ThreatKind::Phishing).await.unwrap();
    assert_eq!(set.revision, 5);
    assert_eq!(set.len(), 2);
    assert_eq!(api.requested_revisions(), vec![0]);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn refresh_requests_current_revision_and_applies_set_algebra() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    store
        .put_hash_prefix_set(
            ThreatKind::Phishing,
            HashPrefixSet::new(2, [prefix("a379a6f6"), prefix("255a8a79")]),
        )
        .await
        .unwrap();
    api.script_prefix_diff(
        ThreatKind::Phishing,
        UpdateDiff::incremental(3, [prefix("9c180de0")], [prefix("a379a6f6")]),
    );

    manager(&store, &api, &sink)
        .update_dataset(PHISHING_PREFIXES)
        .await
        .unwrap();

    assert_eq!(api.requested_revisions(), vec![2]);
    let set = store.hash_prefix_set(ThreatKind::Phishing).await.unwrap();
    assert_eq!(set.revision, 3);
    assert!(set.contains(&prefix("255a8a79")));
    assert!(set.contains(&prefix("9c180de0")));
    assert!(!set.contains(&prefix("a379a6f6")));
}

#[tokio::test]
async fn filter_datasets_sync_too() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    let filter = Filter::new("ab".repeat(32), ".*");
    api.script_filter_diff(
        ThreatKind::Scam,
        UpdateDiff::replacement(7, [filter.clone()]),
    );

    manager(&store, &api, &sink)
        .update_dataset(DatasetKey::new(DataType::FilterSet, ThreatKind::Scam))
        .await
        .unwrap();

    let set = store.filter_set(ThreatKind::Scam).await.unwrap();
    assert_eq!(set.revision, 7);
    assert!(set.contains(&filter));
}

// ── Freshness timestamps ─────────────────────────────────────────

#[tokio::test]
async fn successful_sync_advances_timestamp() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());
    let m = manager(&store, &api, &sink);

    assert_eq!(m.last_update(DataType::HashPrefixSet).await, None);

    m.update_dataset(PHISHING_PREFIXES).await.unwrap();

    assert!(m.last_update(DataType::HashPrefixSet).await.is_some());
    assert_eq!(m.last_update(DataType::FilterSet).await, None);
}

#[tokio::test]
async fn failed_sync_leaves_timestamp_and_dataset_untouched() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    let original = HashPrefixSet::new(1, [prefix("a379a6f6")]);
    store
        .put_hash_prefix_set(ThreatKind::Phishing, original.clone())
        .await
        .unwrap();
    api.fail_for(ThreatKind::Phishing);

    let m = manager(&store, &api, &sink);
    assert!(m.update_dataset(PHISHING_PREFIXES).await.is_err());

    assert_eq!(m.last_update(DataType::HashPrefixSet).await, None);
    let set = store.hash_prefix_set(ThreatKind::Phishing).await.unwrap();
    assert_eq!(set, original);
}

// ── Failure reporting ────────────────────────────────────────────

#[tokio::test]
async fn failed_initial_seed_is_reported() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());
    api.fail_for(ThreatKind::Phishing);

    let result = manager(&store, &api, &sink)
        .update_dataset(PHISHING_PREFIXES)
        .await;

    assert!(result.is_err());
    assert_eq!(
        sink.events(),
        vec![TelemetryEvent::FailedToDownloadInitialDataSets {
            threat: ThreatKind::Phishing,
            data_type: DataType::HashPrefixSet,
        }]
    );
}

#[tokio::test]
async fn failed_refresh_is_not_reported() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    store
        .put_hash_prefix_set(ThreatKind::Phishing, HashPrefixSet::new(4, [prefix("a379a6f6")]))
        .await
        .unwrap();
    api.fail_for(ThreatKind::Phishing);

    let result = manager(&store, &api, &sink)
        .update_dataset(PHISHING_PREFIXES)
        .await;

    assert!(result.is_err());
    assert!(sink.events().is_empty());
}

// ── Gating ───────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_threat_update_is_a_noop() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    let m = UpdateManager::new(
        store.clone(),
        api.clone(),
        Arc::new(Supported([ThreatKind::Scam].into_iter().collect())),
        sink.clone(),
        Arc::new(FixedIntervals::default()),
    );

    m.update_dataset(PHISHING_PREFIXES).await.unwrap();

    assert_eq!(api.prefix_calls(), 0);
    assert!(store
        .hash_prefix_set(ThreatKind::Phishing)
        .await
        .unwrap()
        .is_unpopulated());
}

// ── update_all ───────────────────────────────────────────────────

#[tokio::test]
async fn update_all_syncs_every_supported_threat() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    for threat in ThreatKind::ALL {
        api.script_prefix_diff(threat, UpdateDiff::replacement(1, [prefix("a379a6f6")]));
    }

    manager(&store, &api, &sink)
        .update_all(DataType::HashPrefixSet)
        .await
        .unwrap();

    assert_eq!(api.prefix_calls(), 3);
    for threat in ThreatKind::ALL {
        let set = store.hash_prefix_set(threat).await.unwrap();
        assert_eq!(set.revision, 1);
    }
}

#[tokio::test]
async fn update_all_attempts_every_dataset_before_reporting_failure() {
    let store = Arc::new(MemoryDataStore::new());
    let api = Arc::new(ScriptedApi::default());
    let sink = Arc::new(CollectingSink::default());

    api.fail_for(ThreatKind::Malware);
    api.script_prefix_diff(ThreatKind::Phishing, UpdateDiff::replacement(1, [prefix("a379a6f6")]));
    api.script_prefix_diff(ThreatKind::Scam, UpdateDiff::replacement(2, [prefix("255a8a79")]));

    let result = manager(&store, &api, &sink)
        .update_all(DataType::HashPrefixSet)
        .await;

    assert!(result.is_err());
    // The malware failure did not stop the scam dataset from updating.
    assert_eq!(api.prefix_calls(), 3);
    assert_eq!(
        store.hash_prefix_set(ThreatKind::Phishing).await.unwrap().revision,
        1
    );
    assert_eq!(
        store.hash_prefix_set(ThreatKind::Scam).await.unwrap().revision,
        2
    );
    assert!(store
        .hash_prefix_set(ThreatKind::Malware)
        .await
        .unwrap()
        .is_unpopulated());
}

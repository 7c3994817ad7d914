//! Local-first threat evaluation.

use crate::canonical::{url_digest, UrlDigest};
use crate::events::{EventSink, TelemetryEvent};
use crate::support::ThreatSupport;
use regex::Regex;
use sitesafe_api::ApiClient;
use sitesafe_store::DataStore;
use sitesafe_types::{FilterSet, ThreatKind};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum number of locally stored filters for a threat kind before an
/// [`ErrorPageShown`](TelemetryEvent::ErrorPageShown) event may carry the
/// `client_side_hit` flag. Below this, reporting whether the verdict was
/// local would narrow down which site the user visited.
pub const CLIENT_SIDE_HIT_MIN_LOCAL_FILTERS: usize = 100;

/// Outcome of a per-threat check that found a match.
struct MatchDetails {
    locally_confirmed: bool,
    local_filter_count: usize,
}

/// Classifies URLs against the locally synchronized threat datasets,
/// falling back to the remote match API only when local data is
/// inconclusive.
///
/// Every failure on the evaluation path fails open: a URL is only ever
/// blocked on positive evidence.
pub struct Detector {
    store: Arc<dyn DataStore>,
    api: Arc<dyn ApiClient>,
    support: Arc<dyn ThreatSupport>,
    events: Arc<dyn EventSink>,
}

impl Detector {
    /// Creates a detector over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        api: Arc<dyn ApiClient>,
        support: Arc<dyn ThreatSupport>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            api,
            support,
            events,
        }
    }

    /// Evaluates `url` against every supported threat kind, in the fixed
    /// order of [`ThreatKind::ALL`], and returns the first kind that
    /// matches. `None` means the URL is not known to be malicious.
    ///
    /// Emits [`TelemetryEvent::ErrorPageShown`] on a match.
    pub async fn evaluate(&self, url: &url::Url) -> Option<ThreatKind> {
        let digest = url_digest(url)?;
        let supported = self.support.supported_threats();

        for threat in ThreatKind::ALL {
            if !supported.contains(&threat) {
                continue;
            }
            if let Some(details) = self.check(url, &digest, threat).await {
                let client_side_hit = (details.local_filter_count
                    > CLIENT_SIDE_HIT_MIN_LOCAL_FILTERS)
                    .then_some(details.locally_confirmed);
                self.events.emit(TelemetryEvent::ErrorPageShown {
                    threat,
                    client_side_hit,
                });
                return Some(threat);
            }
        }

        None
    }

    /// Runs the cascade for one threat kind. `Some` only on a confirmed
    /// match.
    async fn check(
        &self,
        url: &url::Url,
        digest: &UrlDigest,
        threat: ThreatKind,
    ) -> Option<MatchDetails> {
        let prefixes = match self.store.hash_prefix_set(threat).await {
            Ok(set) => set,
            Err(err) => {
                warn!("failed to load {threat} hash prefixes: {err}");
                return None;
            }
        };
        if !prefixes.contains(&digest.prefix) {
            return None;
        }

        let filters = match self.store.filter_set(threat).await {
            Ok(set) => set,
            Err(err) => {
                warn!("failed to load {threat} filters: {err}");
                FilterSet::default()
            }
        };
        let local_filter_count = filters.len();

        // Local filters whose full hash matches decide the verdict outright,
        // positive or negative; the match API is only consulted when the
        // local filter set has nothing for this hash.
        let local: Vec<_> = filters
            .items
            .iter()
            .filter(|filter| filter.hash == digest.full)
            .collect();
        if !local.is_empty() {
            return local
                .iter()
                .any(|filter| regex_matches(&filter.regex, url))
                .then_some(MatchDetails {
                    locally_confirmed: true,
                    local_filter_count,
                });
        }

        let remote = match self.api.matches_for_prefix(&digest.prefix).await {
            Ok(matches) => matches,
            Err(err) => {
                if err.is_timeout() {
                    self.events.emit(TelemetryEvent::MatchesApiTimeout);
                } else {
                    self.events.emit(TelemetryEvent::MatchesApiFailure {
                        error: err.to_string(),
                    });
                }
                warn!("match lookup for {threat} failed: {err}");
                return None;
            }
        };

        remote
            .iter()
            .any(|filter| filter.hash == digest.full && regex_matches(&filter.regex, url))
            .then_some(MatchDetails {
                locally_confirmed: false,
                local_filter_count,
            })
    }
}

/// Whether `pattern` matches the literal URL string. Unparseable patterns
/// never match.
fn regex_matches(pattern: &str, url: &url::Url) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(url.as_str()),
        Err(err) => {
            debug!("skipping invalid filter regex {pattern:?}: {err}");
            false
        }
    }
}

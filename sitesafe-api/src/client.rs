//! The `ApiClient` trait.

use crate::ApiResult;
use async_trait::async_trait;
use sitesafe_types::{Filter, HashPrefix, ThreatKind, UpdateDiff};
use std::collections::HashSet;

/// Fetches incremental dataset diffs and full-hash match candidates.
///
/// Both operations surface transport failures as classified
/// [`ApiError`](crate::ApiError)s; timeout policy belongs to the
/// implementation, not to callers.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetches the diff that brings a hash-prefix dataset from
    /// `from_revision` to the server's current revision.
    async fn hash_prefix_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<HashPrefix>>;

    /// Fetches the diff that brings a filter dataset from `from_revision`
    /// to the server's current revision.
    async fn filter_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<Filter>>;

    /// Fetches the authoritative set of full-hash/regex filters whose hashes
    /// start with `prefix`.
    async fn matches_for_prefix(&self, prefix: &HashPrefix) -> ApiResult<HashSet<Filter>>;
}

//! Revisioned threat datasets and the incremental diff format.
//!
//! A dataset is a set of items at a server-assigned revision. Clients never
//! edit datasets directly; they apply [`UpdateDiff`]s fetched for their
//! current revision, which land them on the server's revision in one step.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Length of a hash prefix in hex characters (32 bits of the digest).
pub const HASH_PREFIX_LEN: usize = 8;

/// The first 8 hex characters of a SHA-256 hex digest.
///
/// Space-efficient local membership test: a URL whose canonical-host digest
/// prefix is absent from the set is definitively not in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashPrefix(String);

impl HashPrefix {
    /// Creates a hash prefix, validating length and lowercase-hex charset.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let valid = prefix.len() == HASH_PREFIX_LEN
            && prefix
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(Error::InvalidHashPrefix(prefix));
        }
        Ok(Self(prefix))
    }

    /// Truncates a full hex digest down to its prefix.
    pub fn from_digest(digest: &str) -> Result<Self> {
        Self::new(digest.get(..HASH_PREFIX_LEN).unwrap_or(digest))
    }

    /// The prefix as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HashPrefix {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<HashPrefix> for String {
    fn from(prefix: HashPrefix) -> Self {
        prefix.0
    }
}

impl FromStr for HashPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A full-hash filter: confirms or refutes a prefix hit.
///
/// `hash` is the complete SHA-256 hex digest of a canonical host known to be
/// a threat; `regex` must additionally match the literal URL string before
/// the hit counts, which defends against 32-bit prefix collisions and scopes
/// a flagged host down to its malicious paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub hash: String,
    pub regex: String,
}

impl Filter {
    /// Creates a filter.
    #[must_use]
    pub fn new(hash: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            regex: regex.into(),
        }
    }
}

/// A set of items at a server-assigned revision.
///
/// Datasets start empty at revision 0 on first launch and are mutated only
/// by applying diffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionedSet<T: Eq + Hash> {
    pub revision: u64,
    pub items: HashSet<T>,
}

/// Hash-prefix dataset for one threat kind.
pub type HashPrefixSet = RevisionedSet<HashPrefix>;

/// Filter dataset for one threat kind.
pub type FilterSet = RevisionedSet<Filter>;

impl<T: Eq + Hash> Default for RevisionedSet<T> {
    fn default() -> Self {
        Self {
            revision: 0,
            items: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash> RevisionedSet<T> {
    /// Creates a dataset from a revision and items.
    pub fn new(revision: u64, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            revision,
            items: items.into_iter().collect(),
        }
    }

    /// Number of items in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item is present.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Whether this dataset has never been populated: revision 0 and empty.
    /// Distinguishes initial seeding from a routine refresh.
    #[must_use]
    pub fn is_unpopulated(&self) -> bool {
        self.revision == 0 && self.items.is_empty()
    }
}

impl<T: Eq + Hash + Clone> RevisionedSet<T> {
    /// Applies an incremental diff, yielding the dataset at the diff's
    /// revision.
    ///
    /// A `replace` diff discards prior contents and keeps exactly the insert
    /// set. Otherwise deletes are removed and inserts added as set algebra,
    /// so locally held items the server never knew about are untouched
    /// unless explicitly deleted.
    #[must_use]
    pub fn apply(&self, diff: &UpdateDiff<T>) -> Self {
        let items = if diff.replace {
            diff.insert.clone()
        } else {
            self.items
                .iter()
                .filter(|item| !diff.delete.contains(*item))
                .chain(diff.insert.iter())
                .cloned()
                .collect()
        };
        Self {
            revision: diff.revision,
            items,
        }
    }
}

/// The wire-level incremental sync unit.
///
/// A diff requested at any prior revision brings the client to the server's
/// current revision in one step; no chained application is ever required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Eq + Hash + Serialize",
    deserialize = "T: Eq + Hash + Deserialize<'de>"
))]
pub struct UpdateDiff<T: Eq + Hash> {
    /// When set, the dataset is fully replaced by `insert` and `delete` is
    /// ignored.
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub insert: HashSet<T>,
    #[serde(default)]
    pub delete: HashSet<T>,
    pub revision: u64,
}

impl<T: Eq + Hash> UpdateDiff<T> {
    /// A full-replacement diff.
    pub fn replacement(revision: u64, insert: impl IntoIterator<Item = T>) -> Self {
        Self {
            replace: true,
            insert: insert.into_iter().collect(),
            delete: HashSet::new(),
            revision,
        }
    }

    /// An incremental diff.
    pub fn incremental(
        revision: u64,
        insert: impl IntoIterator<Item = T>,
        delete: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            replace: false,
            insert: insert.into_iter().collect(),
            delete: delete.into_iter().collect(),
            revision,
        }
    }
}

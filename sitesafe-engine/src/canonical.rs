//! URL canonicalization and hashing.
//!
//! Threat datasets are keyed by the SHA-256 digest of a URL's canonical
//! form: the host alone, ASCII-lowercased, with any trailing dots removed.
//! Paths, queries, ports and schemes never participate in hashing; regex
//! filters are what narrow a host-level hash match down to specific pages.

use sha2::{Digest, Sha256};
use sitesafe_types::HashPrefix;
use url::Url;

/// The canonical-form digest of a URL, in both the full and prefix widths
/// the detection cascade needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlDigest {
    /// Full lowercase-hex SHA-256 digest, 64 characters.
    pub full: String,
    /// Leading [`sitesafe_types::HASH_PREFIX_LEN`] characters of `full`.
    pub prefix: HashPrefix,
}

/// Returns the canonical form of `url`: its host, ASCII-lowercased, with
/// trailing dots stripped. `None` when the URL has no usable host (e.g.
/// `data:` or `file:` URLs).
#[must_use]
pub fn canonical_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// Hashes the canonical form of `url`. `None` when the URL has no host.
#[must_use]
pub fn url_digest(url: &Url) -> Option<UrlDigest> {
    let host = canonical_host(url)?;
    let full = hex::encode(Sha256::digest(host.as_bytes()));
    let prefix = HashPrefix::from_digest(&full).ok()?;
    Some(UrlDigest { full, prefix })
}

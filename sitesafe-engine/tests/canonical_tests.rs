use pretty_assertions::assert_eq;
use sitesafe_engine::canonical::{canonical_host, url_digest};
use url::Url;

const EXAMPLE_DIGEST: &str = "a379a6f6eeafb9a55e378c118034e2751e682fab9f2d30ab13d2125586ce1947";
const MALICIOUS_DIGEST: &str = "255a8a793097aeea1f06a19c08cde28db0eb34c660c6e4e7480c9525d034b16d";

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

// ── Canonical form ───────────────────────────────────────────────

#[test]
fn canonical_host_is_the_lowercased_host() {
    assert_eq!(
        canonical_host(&url("https://EXAMPLE.com/Some/Path?q=1")),
        Some("example.com".to_string())
    );
}

#[test]
fn canonical_host_strips_trailing_dots() {
    assert_eq!(
        canonical_host(&url("https://example.com./login")),
        Some("example.com".to_string())
    );
}

#[test]
fn canonical_host_ignores_port_and_scheme() {
    assert_eq!(
        canonical_host(&url("http://example.com:8443/")),
        Some("example.com".to_string())
    );
}

#[test]
fn canonical_host_none_without_host() {
    assert_eq!(canonical_host(&url("data:text/plain,hello")), None);
    assert_eq!(canonical_host(&url("mailto:joe@example.com")), None);
}

// ── Digests ──────────────────────────────────────────────────────

#[test]
fn digest_of_example_com() {
    let digest = url_digest(&url("https://example.com/")).unwrap();
    assert_eq!(digest.full, EXAMPLE_DIGEST);
    assert_eq!(digest.prefix.as_str(), "a379a6f6");
}

#[test]
fn digest_of_malicious_com() {
    let digest = url_digest(&url("https://malicious.com/claim-prize")).unwrap();
    assert_eq!(digest.full, MALICIOUS_DIGEST);
    assert_eq!(digest.prefix.as_str(), "255a8a79");
}

#[test]
fn digest_depends_only_on_the_host() {
    let plain = url_digest(&url("https://example.com/")).unwrap();
    let busy = url_digest(&url("https://example.com:444/deep/path?q=x#frag")).unwrap();
    assert_eq!(plain, busy);
}

#[test]
fn digest_none_without_host() {
    assert!(url_digest(&url("data:text/plain,hello")).is_none());
}

#[test]
fn subdomains_hash_differently() {
    let apex = url_digest(&url("https://example.com/")).unwrap();
    let sub = url_digest(&url("https://www.example.com/")).unwrap();
    assert_ne!(apex.full, sub.full);
}

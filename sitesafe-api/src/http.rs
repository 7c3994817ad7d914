//! HTTP implementation of the threat-data API client.

use crate::{ApiClient, ApiResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sitesafe_types::{Filter, HashPrefix, ThreatKind, UpdateDiff};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpApiClientConfig {
    /// Base URL of the threat-data service
    /// (e.g. `https://api.sitesafe.app/protection`).
    pub base_url: String,
    /// Transport timeout applied to every request.
    pub timeout: Duration,
}

impl Default for HttpApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sitesafe.app/protection".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Wire shape of the matches endpoint response.
#[derive(Debug, Deserialize)]
struct MatchesResponse {
    matches: HashSet<Filter>,
}

/// Production [`ApiClient`] backed by reqwest.
pub struct HttpApiClient {
    config: HttpApiClientConfig,
    client: Client,
}

impl HttpApiClient {
    /// Creates a new HTTP API client.
    #[must_use]
    pub fn new(config: HttpApiClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn diff_url(&self, endpoint: &str, threat: ThreatKind, from_revision: u64) -> String {
        format!(
            "{}/v1/{}/{endpoint}?revision={from_revision}",
            self.config.base_url,
            threat.as_str()
        )
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn hash_prefix_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<HashPrefix>> {
        self.get_json(self.diff_url("hash-prefixes", threat, from_revision))
            .await
    }

    async fn filter_diff(
        &self,
        threat: ThreatKind,
        from_revision: u64,
    ) -> ApiResult<UpdateDiff<Filter>> {
        self.get_json(self.diff_url("filters", threat, from_revision))
            .await
    }

    async fn matches_for_prefix(&self, prefix: &HashPrefix) -> ApiResult<HashSet<Filter>> {
        let url = format!("{}/v1/matches?hashPrefix={prefix}", self.config.base_url);
        let response: MatchesResponse = self.get_json(url).await?;
        Ok(response.matches)
    }
}

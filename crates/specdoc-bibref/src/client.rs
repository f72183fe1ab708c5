//! Remote reference-database client.
//!
//! The remote database answers batched GET requests of the form
//! `<endpoint>?refs=key1,key2,...` with a JSON mapping from key to record.
//! Keys absent from the response were not found, which is not an error by
//! itself — absence only matters if no local override covers the key
//! either, and that determination belongs to the resolution engine.

use crate::error::{Error, Result};
use crate::record::RefMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the remote reference-database client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BibrefConfig {
    /// Endpoint answering `?refs=` batch queries.
    pub endpoint: String,

    /// Per-request timeout in seconds. A timed-out request is treated
    /// exactly like any other failed fetch.
    pub timeout_secs: u64,

    /// Maximum number of keys per batched request. Larger referenced sets
    /// are split into this many keys per request.
    pub batch_size: usize,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for BibrefConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.specref.org/bibrefs".to_string(),
            timeout_secs: 10,
            batch_size: 64,
            user_agent: concat!("specdoc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Advisory network hint pointing at the reference-database host, suitable
/// for emission as a `<link rel="dns-prefetch">` resource. A missing hint
/// is never a functional failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkHint {
    pub rel: String,
    pub href: String,
}

/// The injectable lookup boundary between the resolution engine and the
/// network. Production code uses [`BibrefClient`]; tests substitute
/// [`StaticLookup`] or any other implementation.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    /// Fetch records for the given keys.
    ///
    /// Keys absent from the returned map were not found. An `Err` means the
    /// source produced no data at all and callers should treat the service
    /// as unreachable for this pass.
    async fn lookup(&self, keys: &[String]) -> Result<RefMap>;
}

/// HTTP client for the remote reference database.
pub struct BibrefClient {
    http: reqwest::Client,
    config: BibrefConfig,
}

impl BibrefClient {
    /// Build a client from the given configuration.
    pub fn new(config: BibrefConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(Self { http, config })
    }

    /// Build a client with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(BibrefConfig::default())
    }

    pub fn config(&self) -> &BibrefConfig {
        &self.config
    }

    /// Advisory reachability probe (HEAD against the endpoint).
    ///
    /// The result is informational only: per-key fetch outcomes are
    /// authoritative, and resolution proceeds regardless of what the probe
    /// says.
    pub async fn probe(&self) -> bool {
        match self.http.head(&self.config.endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(error = %error, "reference database probe failed");
                false
            }
        }
    }

    /// Dns-prefetch hint for the endpoint host, if the endpoint URL parses.
    pub fn prefetch_hint(&self) -> Option<NetworkHint> {
        let url = reqwest::Url::parse(&self.config.endpoint).ok()?;
        let host = url.host_str()?;
        Some(NetworkHint {
            rel: "dns-prefetch".to_string(),
            href: format!("{}://{}", url.scheme(), host),
        })
    }

    async fn fetch_chunk(&self, chunk: &[String]) -> Result<RefMap> {
        let refs = chunk.join(",");
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("refs", refs.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RemoteLookup for BibrefClient {
    /// One batched request per chunk of `batch_size` keys, issued
    /// concurrently. A failed chunk contributes no records and its keys
    /// end up unresolved unless covered elsewhere; the call errors only
    /// when every chunk fails.
    async fn lookup(&self, keys: &[String]) -> Result<RefMap> {
        if keys.is_empty() {
            return Ok(RefMap::new());
        }

        let chunks: Vec<&[String]> = keys.chunks(self.config.batch_size.max(1)).collect();
        let total = chunks.len();
        let results =
            futures::future::join_all(chunks.iter().map(|chunk| self.fetch_chunk(chunk))).await;

        let mut merged = RefMap::new();
        let mut failed = 0usize;
        for result in results {
            match result {
                Ok(records) => merged.extend(records),
                Err(error) => {
                    failed += 1;
                    tracing::warn!(error = %error, "reference batch fetch failed");
                }
            }
        }

        if failed == total {
            return Err(Error::ServiceUnavailable);
        }
        tracing::debug!(
            requested = keys.len(),
            found = merged.len(),
            "reference lookup completed"
        );
        Ok(merged)
    }
}

/// In-memory lookup over a fixed record mapping.
///
/// Behaves like a fully reachable database containing exactly the given
/// records: requested keys present in the map are returned, everything
/// else is "not found". Used by tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: RefMap,
}

impl StaticLookup {
    pub fn new(records: RefMap) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RemoteLookup for StaticLookup {
    async fn lookup(&self, keys: &[String]) -> Result<RefMap> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.records
                    .get(key)
                    .map(|record| (key.clone(), record.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BiblioRecord;

    #[test]
    fn test_default_config() {
        let config = BibrefConfig::default();
        assert!(config.endpoint.starts_with("https://"));
        assert_eq!(config.timeout_secs, 10);
        assert!(config.batch_size > 0);
    }

    #[test]
    fn test_config_deserializes_with_partial_fields() {
        let config: BibrefConfig =
            serde_json::from_str(r#"{"timeout_secs": 3}"#).unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.batch_size, BibrefConfig::default().batch_size);
    }

    #[test]
    fn test_prefetch_hint_points_at_endpoint_host() {
        let client = BibrefClient::new(BibrefConfig {
            endpoint: "https://refs.example.org/lookup".to_string(),
            ..BibrefConfig::default()
        })
        .unwrap();

        let hint = client.prefetch_hint().unwrap();
        assert_eq!(hint.rel, "dns-prefetch");
        assert_eq!(hint.href, "https://refs.example.org");
    }

    #[tokio::test]
    async fn test_static_lookup_returns_only_requested_keys() {
        let mut records = RefMap::new();
        records.insert(
            "dom".to_string(),
            BiblioRecord {
                title: Some("DOM Standard".to_string()),
                ..Default::default()
            },
        );
        records.insert(
            "html".to_string(),
            BiblioRecord {
                title: Some("HTML Standard".to_string()),
                ..Default::default()
            },
        );
        let lookup = StaticLookup::new(records);

        let found = lookup
            .lookup(&["dom".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("dom"));
        assert!(!found.contains_key("html"));
    }

    #[tokio::test]
    async fn test_static_lookup_empty_request() {
        let lookup = StaticLookup::default();
        let found = lookup.lookup(&[]).await.unwrap();
        assert!(found.is_empty());
    }
}

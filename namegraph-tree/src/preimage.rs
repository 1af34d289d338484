//! Label preimage collaborators.
//!
//! The registry stores only Keccak-256 label hashes; the plaintext comes
//! from an external preimage database. Lookup failure is a degraded but
//! valid outcome — a missing label never fails a tree build.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use namegraph_core::error::Result;
use namegraph_core::namehash::labelhash;
use namegraph_core::traits::LabelDecryptor;
use namegraph_core::types::Hash256;

/// Preimage service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreimageConfig {
    /// Batch lookup endpoint.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl PreimageConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Serialize)]
struct PreimageRequest {
    hashes: Vec<String>,
}

#[derive(Deserialize)]
struct PreimageResponse {
    labels: Vec<Option<String>>,
}

/// HTTP batch client for a label preimage service.
///
/// Posts the whole batch in one request. Any transport or decoding
/// failure degrades to all-unknown labels instead of erroring: the tree
/// still builds, with placeholder names.
pub struct HttpPreimageClient {
    config: PreimageConfig,
    http_client: reqwest::Client,
}

impl HttpPreimageClient {
    /// Creates a client for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_config(PreimageConfig::new(endpoint))
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: PreimageConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    async fn lookup(&self, hashes: &[Hash256]) -> Option<Vec<Option<String>>> {
        let request = PreimageRequest {
            hashes: hashes.iter().map(Hash256::to_hex_string).collect(),
        };

        let response = match self
            .http_client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "preimage service unreachable");
                return None;
            }
        };

        match response.json::<PreimageResponse>().await {
            Ok(parsed) if parsed.labels.len() == hashes.len() => Some(parsed.labels),
            Ok(parsed) => {
                warn!(
                    expected = hashes.len(),
                    got = parsed.labels.len(),
                    "preimage response length mismatch"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "malformed preimage response");
                None
            }
        }
    }
}

#[async_trait]
impl LabelDecryptor for HttpPreimageClient {
    async fn decrypt_hashes(&self, hashes: &[Hash256]) -> Result<Vec<Option<String>>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }

        match self.lookup(hashes).await {
            Some(labels) => {
                debug!(
                    total = hashes.len(),
                    known = labels.iter().filter(|l| l.is_some()).count(),
                    "preimage batch resolved"
                );
                Ok(labels)
            }
            // Degraded: every label stays encrypted
            None => Ok(vec![None; hashes.len()]),
        }
    }
}

/// In-memory preimage table, self-keyed by labelhash.
///
/// Useful for tests and for offline operation where the set of known
/// labels ships with the caller.
#[derive(Debug, Default)]
pub struct StaticLabelTable {
    entries: DashMap<Hash256, String>,
}

impl StaticLabelTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a known label under its own hash.
    pub fn insert(&self, label: impl Into<String>) {
        let label = label.into();
        self.entries.insert(labelhash(&label), label);
    }

    /// Registers many labels at once.
    pub fn insert_many<I, S>(&self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            self.insert(label);
        }
    }

    /// Number of known labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no labels are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LabelDecryptor for StaticLabelTable {
    async fn decrypt_hashes(&self, hashes: &[Hash256]) -> Result<Vec<Option<String>>> {
        Ok(hashes
            .iter()
            .map(|h| self.entries.get(h).map(|entry| entry.value().clone()))
            .collect())
    }
}

//! JSON-RPC 2.0 transport over HTTP.
//!
//! The production [`ChainTransport`]: each trait method is one JSON-RPC
//! request against the configured provider. Contract reverts and RPC
//! errors map to [`NamegraphError::ChainCall`]; network failures map to
//! [`NamegraphError::Http`]. No retries — timeout policy is the HTTP
//! client's.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use namegraph_core::error::{NamegraphError, Result};
use namegraph_core::traits::ChainTransport;
use namegraph_core::types::{Address, Hash256, LogFilter, RawLog, TxHash};

/// Default Ethereum RPC URL when none is provided.
const DEFAULT_ETH_RPC_URL: &str = "https://ethereum.publicnode.com";

/// Transport configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Ethereum JSON-RPC endpoint
    pub rpc_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_ETH_RPC_URL.into(),
            timeout_seconds: 30,
        }
    }
}

impl RpcConfig {
    /// Creates a new configuration with the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// JSON-RPC transport backed by `reqwest`.
pub struct HttpTransport {
    config: RpcConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a transport for the given RPC URL with default settings.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_config(RpcConfig::new(rpc_url))
    }

    /// Creates a transport with custom configuration.
    pub fn with_config(config: RpcConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        }
    }

    /// Issues one JSON-RPC request and unwraps the `result` field.
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });

        debug!(method, id, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NamegraphError::Http(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| NamegraphError::Http(e.to_string()))?;

        if let Some(error) = body.get("error") {
            let reason = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            warn!(method, reason, "JSON-RPC error");
            return Err(NamegraphError::ChainCall {
                method: method.to_string(),
                reason,
            });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| NamegraphError::Rpc(format!("missing result for {method}")))
    }

    /// Parses a `0x`-prefixed quantity.
    fn parse_quantity(value: &Value) -> Result<u64> {
        let s = value
            .as_str()
            .ok_or_else(|| NamegraphError::Rpc("quantity is not a string".into()))?;
        let s = s.strip_prefix("0x").unwrap_or(s);
        u64::from_str_radix(s, 16).map_err(|e| NamegraphError::Rpc(format!("bad quantity: {e}")))
    }

    /// Parses `0x`-prefixed byte data.
    fn parse_bytes(value: &Value) -> Result<Vec<u8>> {
        let s = value
            .as_str()
            .ok_or_else(|| NamegraphError::Rpc("data is not a string".into()))?;
        Ok(hex::decode(s.strip_prefix("0x").unwrap_or(s))?)
    }

    /// Parses one raw log record.
    fn parse_log(value: &Value) -> Result<RawLog> {
        let topics = value
            .get("topics")
            .and_then(|t| t.as_array())
            .ok_or_else(|| NamegraphError::Rpc("log without topics".into()))?
            .iter()
            .map(|t| {
                t.as_str()
                    .ok_or_else(|| NamegraphError::Rpc("topic is not a string".into()))
                    .and_then(Hash256::from_hex)
            })
            .collect::<Result<Vec<_>>>()?;

        let data = value
            .get("data")
            .map(Self::parse_bytes)
            .transpose()?
            .unwrap_or_default();

        let block_number = value
            .get("blockNumber")
            .map(Self::parse_quantity)
            .transpose()?
            .unwrap_or(0);

        Ok(RawLog {
            topics,
            data,
            block_number,
        })
    }
}

#[async_trait]
impl ChainTransport for HttpTransport {
    #[instrument(skip(self, data))]
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let params = json!([
            {
                "to": to.to_hex_string(),
                "data": format!("0x{}", hex::encode(&data))
            },
            "latest"
        ]);
        let result = self.request("eth_call", params).await?;
        Self::parse_bytes(&result)
    }

    #[instrument(skip(self, data))]
    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<TxHash> {
        let params = json!([{
            "from": from.to_hex_string(),
            "to": to.to_hex_string(),
            "data": format!("0x{}", hex::encode(&data))
        }]);
        let result = self.request("eth_sendTransaction", params).await?;
        let s = result
            .as_str()
            .ok_or_else(|| NamegraphError::Rpc("tx hash is not a string".into()))?;
        Hash256::from_hex(s)
    }

    #[instrument(skip(self, filter), fields(from_block = filter.from_block))]
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        let topics: Vec<Value> = filter
            .topics
            .iter()
            .map(|t| match t {
                Some(hash) => Value::String(hash.to_hex_string()),
                None => Value::Null,
            })
            .collect();

        let to_block = match filter.to_block {
            Some(block) => format!("0x{block:x}"),
            None => "latest".to_string(),
        };

        let params = json!([{
            "address": filter.address.to_hex_string(),
            "topics": topics,
            "fromBlock": format!("0x{:x}", filter.from_block),
            "toBlock": to_block
        }]);

        let result = self.request("eth_getLogs", params).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| NamegraphError::Rpc("eth_getLogs result is not an array".into()))?;

        entries.iter().map(Self::parse_log).collect()
    }

    #[instrument(skip(self))]
    async fn block_number(&self) -> Result<u64> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        Self::parse_quantity(&result)
    }

    #[instrument(skip(self))]
    async fn accounts(&self) -> Result<Vec<Address>> {
        let result = self.request("eth_accounts", json!([])).await?;
        result
            .as_array()
            .ok_or_else(|| NamegraphError::Rpc("eth_accounts result is not an array".into()))?
            .iter()
            .map(|a| {
                a.as_str()
                    .ok_or_else(|| NamegraphError::Rpc("account is not a string".into()))
                    .and_then(Address::from_hex)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(HttpTransport::parse_quantity(&json!("0x10")).unwrap(), 16);
        assert_eq!(HttpTransport::parse_quantity(&json!("0x0")).unwrap(), 0);
        assert!(HttpTransport::parse_quantity(&json!(16)).is_err());
        assert!(HttpTransport::parse_quantity(&json!("0xzz")).is_err());
    }

    #[test]
    fn test_parse_bytes() {
        assert_eq!(
            HttpTransport::parse_bytes(&json!("0x0102")).unwrap(),
            vec![1, 2]
        );
        assert!(HttpTransport::parse_bytes(&json!("0x")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_log() {
        let value = json!({
            "topics": [
                "0x1111111111111111111111111111111111111111111111111111111111111111"
            ],
            "data": "0x0102",
            "blockNumber": "0x2a"
        });
        let log = HttpTransport::parse_log(&value).unwrap();
        assert_eq!(log.topics.len(), 1);
        assert_eq!(log.data, vec![1, 2]);
        assert_eq!(log.block_number, 42);
    }

    #[test]
    fn test_config_builder() {
        let config = RpcConfig::new("https://example.com").timeout_seconds(5);
        assert_eq!(config.rpc_url, "https://example.com");
        assert_eq!(config.timeout_seconds, 5);
    }
}

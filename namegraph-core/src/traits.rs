//! Collaborator interfaces.
//!
//! These traits are the seams between namegraph and its external
//! collaborators: the wallet-connected chain provider and the label
//! preimage service. Both are consumed as trait objects so tests can
//! substitute scripted implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Address, Hash256, LogFilter, RawLog, TxHash};

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN TRANSPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// A wallet-connected Ethereum provider.
///
/// Every method is one network round trip. Timeout policy belongs to the
/// implementation; this interface performs no retries and offers no
/// cancellation — an issued call runs to completion or fails.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Executes a read-only contract call and returns the raw output.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Submits a signed transaction and returns its pending hash.
    ///
    /// The signature comes from the provider's wallet for `from`; the
    /// returned hash is not a confirmation.
    async fn send_transaction(&self, from: Address, to: Address, data: Vec<u8>) -> Result<TxHash>;

    /// Queries historical logs, returned in chronological order.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>>;

    /// Current chain head block number.
    async fn block_number(&self) -> Result<u64>;

    /// Accounts the provider can sign for; the first is the active one.
    async fn accounts(&self) -> Result<Vec<Address>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL PREIMAGE SERVICE
// ═══════════════════════════════════════════════════════════════════════════════

/// Batch lookup of label-hash preimages.
///
/// The registry only stores label hashes; recovering the human-readable
/// labels requires an external preimage database. `None` at a position
/// means the plaintext is unknown — a degraded but valid outcome, never
/// an error.
#[async_trait]
pub trait LabelDecryptor: Send + Sync {
    /// Resolves a batch of label hashes to plaintext labels.
    ///
    /// The output corresponds positionally to the input.
    async fn decrypt_hashes(&self, hashes: &[Hash256]) -> Result<Vec<Option<String>>>;
}

//! Historical log queries and the subnode-creation event.

use serde::{Deserialize, Serialize};

use crate::error::{NamegraphError, Result};
use crate::types::{Address, Hash256};

/// Filter for a historical log query against one contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Contract emitting the logs.
    pub address: Address,
    /// Topic filter; position 0 is the event signature hash. `None`
    /// matches anything at that position.
    pub topics: Vec<Option<Hash256>>,
    /// First block of the scan range, inclusive.
    pub from_block: u64,
    /// Last block of the scan range; `None` means the chain head.
    pub to_block: Option<u64>,
}

/// A raw log record as returned by the transport, chronological order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLog {
    /// Indexed topics, signature hash first.
    pub topics: Vec<Hash256>,
    /// Non-indexed data, a sequence of 32-byte words.
    pub data: Vec<u8>,
    /// Block the log was emitted in.
    pub block_number: u64,
}

/// A decoded `NewOwner(bytes32,bytes32,address)` event: a subnode was
/// created or reassigned under the filtered parent node.
///
/// Multiple events may carry the same label (re-creation after deletion);
/// only the chronologically last one reflects current state, and a zero
/// owner there means the subdomain was relinquished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainEvent {
    /// Keccak-256 of the subdomain's label.
    pub label_hash: Hash256,
    /// Owner assigned by this event. Stale for anything but the last
    /// event of a label.
    pub owner: Address,
    /// Block the event was emitted in.
    pub block_number: u64,
}

impl SubdomainEvent {
    /// Decodes a `NewOwner` log: topics are `[signature, node, label]`,
    /// the data word is the left-padded owner address.
    pub fn from_log(log: &RawLog) -> Result<Self> {
        if log.topics.len() < 3 {
            return Err(NamegraphError::AbiDecode(format!(
                "NewOwner log carries {} topics, expected 3",
                log.topics.len()
            )));
        }
        if log.data.len() < 32 {
            return Err(NamegraphError::AbiDecode(format!(
                "NewOwner log data is {} bytes, expected a 32-byte word",
                log.data.len()
            )));
        }

        let owner = Address::from_bytes(&log.data[12..32])?;
        Ok(Self {
            label_hash: log.topics[2],
            owner,
            block_number: log.block_number,
        })
    }
}

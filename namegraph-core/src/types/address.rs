//! Fixed-size chain primitives.
//!
//! - [`Address`]: a 20-byte Ethereum account or contract address
//! - [`Hash256`]: a 32-byte word (namehash, labelhash, tx hash, content hash)
//!
//! Both serialize as lowercase `0x`-prefixed hex strings, the form the
//! JSON-RPC boundary speaks, and both treat the all-zero value as the
//! "unset" sentinel.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{ADDRESS_SIZE, WORD_SIZE};
use crate::error::{NamegraphError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte Ethereum address.
///
/// The zero address means "unset": a node without a resolver reports the
/// zero address, and assigning a subnode to the zero address deletes it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    bytes: [u8; ADDRESS_SIZE],
}

impl Address {
    /// Creates an address from a fixed-size array.
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(NamegraphError::Validation(format!(
                "address: expected {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Parses from a hex string (with or without `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the lowercase `0x`-prefixed hex form.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the zero address.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; ADDRESS_SIZE],
        }
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex_string())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASH256
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte word: namehash, labelhash, content hash, or transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256 {
    bytes: [u8; WORD_SIZE],
}

/// A pending transaction identifier returned by write operations.
///
/// This is the hash of the submitted transaction, not a confirmation.
pub type TxHash = Hash256;

impl Hash256 {
    /// Creates a hash from a fixed-size array.
    pub const fn new(bytes: [u8; WORD_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a hash from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != WORD_SIZE {
            return Err(NamegraphError::Validation(format!(
                "hash: expected {} bytes, got {}",
                WORD_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; WORD_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Parses from a hex string (with or without `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the underlying array.
    pub fn to_array(&self) -> [u8; WORD_SIZE] {
        self.bytes
    }

    /// Returns the lowercase `0x`-prefixed hex form.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the last `n` hex characters of the hash.
    ///
    /// Used to make placeholder labels for undecrypted subdomains
    /// distinguishable from each other.
    pub fn tail_hex(&self, n: usize) -> String {
        let full = hex::encode(self.bytes);
        full[full.len().saturating_sub(n)..].to_string()
    }

    /// Returns the zero hash.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; WORD_SIZE],
        }
    }

    /// Returns true if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash256({})", self.to_hex_string())
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0x12; 20]);
        let hex = addr.to_hex_string();
        let addr2 = Address::from_hex(&hex).unwrap();
        assert_eq!(addr, addr2);
    }

    #[test]
    fn test_address_formatting() {
        let addr = Address::new([0xAB; 20]);
        let s = addr.to_hex_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42); // "0x" + 40 hex chars
    }

    #[test]
    fn test_address_zero() {
        let zero = Address::zero();
        assert!(zero.is_zero());

        let non_zero = Address::new([1; 20]);
        assert!(!non_zero.is_zero());
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_bytes(&[0u8; 21]).is_err());
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Hash256::new([0xCD; 32]);
        let hash2 = Hash256::from_hex(&hash.to_hex_string()).unwrap();
        assert_eq!(hash, hash2);
    }

    #[test]
    fn test_hash_tail_hex() {
        let mut bytes = [0u8; 32];
        bytes[29] = 0xde;
        bytes[30] = 0x12;
        bytes[31] = 0x34;
        let hash = Hash256::new(bytes);
        assert_eq!(hash.tail_hex(6), "de1234");
        assert_eq!(hash.tail_hex(4), "1234");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr = Address::new([0x01; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex_string()));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_hash_serde_roundtrip() {
        let hash = Hash256::new([0x77; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}

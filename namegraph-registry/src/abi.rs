//! Minimal ABI encoding for the registry and resolver call surface.
//!
//! The contracts here only ever exchange `bytes32`, `address`, and one
//! dynamic `string`, so a handful of word-level helpers replaces a full
//! ABI library. Selectors are the first four bytes of the Keccak-256 of
//! the canonical signature.

use namegraph_core::error::{NamegraphError, Result};
use namegraph_core::keccak256;
use namegraph_core::types::{Address, Hash256};
use namegraph_core::WORD_SIZE;

/// A 32-byte ABI word.
pub type Word = [u8; WORD_SIZE];

/// Computes the 4-byte function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash.as_bytes()[..4]);
    sel
}

/// Encodes an address as a left-padded word.
pub fn address_word(addr: &Address) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(addr.as_bytes());
    word
}

/// Encodes a hash as a word.
pub fn hash_word(hash: &Hash256) -> Word {
    hash.to_array()
}

/// Builds calldata for a function of static word arguments.
pub fn call_data(signature: &str, words: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + words.len() * WORD_SIZE);
    data.extend_from_slice(&selector(signature));
    for word in words {
        data.extend_from_slice(word);
    }
    data
}

/// Builds calldata for a function taking a single dynamic `string`:
/// offset word, length word, then the bytes right-padded to a word
/// boundary.
pub fn call_data_with_string(signature: &str, value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD_SIZE) * WORD_SIZE;

    let mut data = Vec::with_capacity(4 + 2 * WORD_SIZE + padded_len);
    data.extend_from_slice(&selector(signature));

    let mut offset = [0u8; WORD_SIZE];
    offset[WORD_SIZE - 1] = 0x20;
    data.extend_from_slice(&offset);

    let mut length = [0u8; WORD_SIZE];
    length[WORD_SIZE - 8..].copy_from_slice(&(bytes.len() as u64).to_be_bytes());
    data.extend_from_slice(&length);

    data.extend_from_slice(bytes);
    data.resize(4 + 2 * WORD_SIZE + padded_len, 0);
    data
}

/// Decodes a single address word from call output.
pub fn decode_address(output: &[u8]) -> Result<Address> {
    if output.len() < WORD_SIZE {
        return Err(NamegraphError::AbiDecode(format!(
            "expected an address word, got {} bytes",
            output.len()
        )));
    }
    Address::from_bytes(&output[12..WORD_SIZE])
}

/// Decodes a single hash word from call output.
pub fn decode_hash(output: &[u8]) -> Result<Hash256> {
    if output.len() < WORD_SIZE {
        return Err(NamegraphError::AbiDecode(format!(
            "expected a 32-byte word, got {} bytes",
            output.len()
        )));
    }
    Hash256::from_bytes(&output[..WORD_SIZE])
}

/// Decodes a single ABI-encoded `string` from call output.
///
/// An empty output decodes as the empty string (an unset record), but a
/// present-yet-truncated encoding is an error.
pub fn decode_string(output: &[u8]) -> Result<String> {
    if output.is_empty() {
        return Ok(String::new());
    }
    if output.len() < 2 * WORD_SIZE {
        return Err(NamegraphError::AbiDecode(format!(
            "string output too short: {} bytes",
            output.len()
        )));
    }

    // offset word, then length word at that offset
    let length = u64::from_be_bytes(
        output[2 * WORD_SIZE - 8..2 * WORD_SIZE]
            .try_into()
            .map_err(|_| NamegraphError::AbiDecode("malformed length word".into()))?,
    ) as usize;

    if length == 0 {
        return Ok(String::new());
    }
    if output.len() < 2 * WORD_SIZE + length {
        return Err(NamegraphError::AbiDecode(format!(
            "string claims {} bytes but only {} remain",
            length,
            output.len() - 2 * WORD_SIZE
        )));
    }

    String::from_utf8(output[2 * WORD_SIZE..2 * WORD_SIZE + length].to_vec())
        .map_err(|e| NamegraphError::AbiDecode(e.to_string()))
}

//! EIP-137 name hashing.
//!
//! `namehash` maps a dotted name to the 32-byte node id the registry is
//! keyed by: the empty name is the zero word, and each label folds in
//! right-to-left as `keccak256(node || keccak256(label))`. Pure functions,
//! no I/O.

use sha3::{Digest, Keccak256};

use crate::types::Hash256;

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash256 {
    Hash256::new(Keccak256::digest(data).into())
}

/// Keccak-256 of a single label, the subnode key used by the registry.
pub fn labelhash(label: &str) -> Hash256 {
    keccak256(label.as_bytes())
}

/// Computes the EIP-137 namehash for a dotted name.
///
/// `namehash("")` is the zero word; empty labels are skipped, so stray
/// dots do not change the result.
pub fn namehash(name: &str) -> Hash256 {
    let mut node = [0u8; 32];

    for label in name.rsplit('.') {
        if label.is_empty() {
            continue;
        }

        let label_hash = Keccak256::digest(label.as_bytes());

        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&node);
        combined[32..].copy_from_slice(&label_hash);

        node = Keccak256::digest(combined).into();
    }

    Hash256::new(node)
}

/// Composes a child node id from its parent node and label hash.
///
/// Equivalent to `namehash(label.parent)` without needing the plaintext
/// label, which is what lets tree discovery continue below subdomains
/// whose labels were never decrypted.
pub fn subnode(parent: &Hash256, label_hash: &Hash256) -> Hash256 {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(parent.as_bytes());
    combined[32..].copy_from_slice(label_hash.as_bytes());
    keccak256(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_empty_name_is_zero() {
        assert!(namehash("").is_zero());
    }

    // EIP-137 reference vectors
    #[test_case("eth", "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")]
    #[test_case("foo.eth", "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")]
    fn test_reference_vectors(name: &str, expected_hex: &str) {
        assert_eq!(namehash(name), Hash256::from_hex(expected_hex).unwrap());
    }

    #[test]
    fn test_labelhash_eth() {
        assert_eq!(
            labelhash("eth"),
            Hash256::from_hex("4f5b812789fc606be1b3b16908db13fc7a9adf7ca72641f84d75b47069d3d7f0")
                .unwrap()
        );
    }

    #[test]
    fn test_stray_dots_are_skipped() {
        assert_eq!(namehash("foo..eth"), namehash("foo.eth"));
        assert_eq!(namehash(".eth"), namehash("eth"));
    }

    #[test]
    fn test_subnode_matches_namehash() {
        let parent = namehash("example.eth");
        assert_eq!(
            subnode(&parent, &labelhash("vault")),
            namehash("vault.example.eth")
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // namehash(a.b) depends only on namehash(b) and keccak(a)
            #[test]
            fn namehash_composes_from_label_and_parent(
                label in "[a-z0-9]{1,16}",
                parent in "[a-z0-9]{1,16}",
            ) {
                let name = format!("{label}.{parent}");
                prop_assert_eq!(
                    namehash(&name),
                    subnode(&namehash(&parent), &labelhash(&label))
                );
            }

            #[test]
            fn namehash_is_deterministic(name in "[a-z0-9.]{0,32}") {
                prop_assert_eq!(namehash(&name), namehash(&name));
            }
        }
    }
}

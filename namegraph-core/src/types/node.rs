//! Domain tree model.
//!
//! A [`DomainNode`] is one name in the registry's ownership tree together
//! with its subdomains. Trees are rebuilt fresh on every walk; a returned
//! node owns its children exclusively and is never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::{PLACEHOLDER_LABEL_PREFIX, PLACEHOLDER_TAIL_CHARS};
use crate::types::{Address, Hash256};

/// Records attached to a node through its resolver contract.
///
/// Present only when the node's resolver is non-zero; never fetched for
/// resolver-less nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverDetail {
    /// Address record (`addr`), zero when unset.
    pub addr: Address,
    /// Content hash record (`content`), zero when unset.
    pub content: Hash256,
}

/// One name in the registry tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainNode {
    /// Fully qualified name, `label.parent`.
    pub name: String,
    /// The leftmost label. A placeholder like `unknown1234` when the
    /// label hash could not be decrypted.
    pub label: String,
    /// Keccak-256 of the plaintext label.
    pub label_hash: Hash256,
    /// The parent name this node hangs under.
    pub parent: String,
    /// Current owner. For undecrypted nodes this is the owner recorded in
    /// the creation log, since the name cannot be queried.
    pub owner: Address,
    /// Resolver contract, zero when none is set. A zero resolver is a
    /// valid terminal state, not a pending fetch.
    pub resolver: Address,
    /// Whether the label hash was decrypted to its plaintext.
    pub decrypted: bool,
    /// Resolver records, present only when `resolver` is non-zero.
    pub detail: Option<ResolverDetail>,
    /// Subdomains, latest-created first.
    pub children: Vec<DomainNode>,
}

impl DomainNode {
    /// True when a resolver contract is set for this node.
    pub fn has_resolver(&self) -> bool {
        !self.resolver.is_zero()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(DomainNode::size).sum::<usize>()
    }
}

/// Builds the display label for a subdomain whose preimage is unknown:
/// `unknown` plus the tail of the label hash.
pub fn placeholder_label(label_hash: &Hash256) -> String {
    format!(
        "{}{}",
        PLACEHOLDER_LABEL_PREFIX,
        label_hash.tail_hex(PLACEHOLDER_TAIL_CHARS)
    )
}

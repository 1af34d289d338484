//! Contract signatures and well-known values for the ENS registry.
//!
//! Function selectors are derived from these signature strings with
//! Keccak-256 at the ABI layer rather than hardcoded, so the strings here
//! are the single source of truth for the contract surface.

use crate::types::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY CONTRACT
// ═══════════════════════════════════════════════════════════════════════════════

/// Mainnet ENS registry contract address.
pub const ENS_REGISTRY: Address = Address::new([
    0x31, 0x41, 0x59, 0x26, 0x5d, 0xd8, 0xdb, 0xb3, 0x10, 0x64, 0x2f, 0x98, 0xf5, 0x0c, 0x06,
    0x61, 0x73, 0xc1, 0x25, 0x9b,
]);

/// Block at which the mainnet registry was deployed.
///
/// Historical log scans start here; nothing relevant exists earlier.
pub const ENS_DEPLOYED_BLOCK: u64 = 3_327_417;

/// `owner(bytes32)` — current owner of a node.
pub const SIG_OWNER: &str = "owner(bytes32)";

/// `resolver(bytes32)` — resolver contract for a node (zero = unset).
pub const SIG_RESOLVER: &str = "resolver(bytes32)";

/// `setOwner(bytes32,address)` — transfer ownership of a node.
pub const SIG_SET_OWNER: &str = "setOwner(bytes32,address)";

/// `setResolver(bytes32,address)` — point a node at a resolver.
pub const SIG_SET_RESOLVER: &str = "setResolver(bytes32,address)";

/// `setSubnodeOwner(bytes32,bytes32,address)` — create or reassign a
/// subnode; a zero owner is the deletion idiom.
pub const SIG_SET_SUBNODE_OWNER: &str = "setSubnodeOwner(bytes32,bytes32,address)";

/// `NewOwner(bytes32,bytes32,address)` — emitted on every subnode
/// creation or reassignment. Node and label are indexed topics, the new
/// owner rides in the data word.
pub const EVENT_NEW_OWNER: &str = "NewOwner(bytes32,bytes32,address)";

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER CONTRACT
// ═══════════════════════════════════════════════════════════════════════════════

/// `addr(bytes32)` — address record for a node.
pub const SIG_ADDR: &str = "addr(bytes32)";

/// `setAddr(bytes32,address)` — set the address record.
pub const SIG_SET_ADDR: &str = "setAddr(bytes32,address)";

/// `content(bytes32)` — content hash record for a node.
pub const SIG_CONTENT: &str = "content(bytes32)";

/// `setContent(bytes32,bytes32)` — set the content hash record.
pub const SIG_SET_CONTENT: &str = "setContent(bytes32,bytes32)";

/// `name(bytes32)` — name record (reverse resolution).
pub const SIG_NAME: &str = "name(bytes32)";

// ═══════════════════════════════════════════════════════════════════════════════
// REVERSE REGISTRAR
// ═══════════════════════════════════════════════════════════════════════════════

/// Mainnet reverse registrar contract address.
pub const REVERSE_REGISTRAR: Address = Address::new([
    0x90, 0x62, 0xc0, 0xa6, 0xdb, 0xd6, 0x10, 0x83, 0x36, 0xbc, 0xbe, 0x45, 0x93, 0xa3, 0xd1,
    0xce, 0x05, 0x51, 0x20, 0x69,
]);

/// Parent domain of all reverse records: `<hex-address>.addr.reverse`.
pub const ADDR_REVERSE_SUFFIX: &str = "addr.reverse";

/// `claimWithResolver(address,address)` — claim the caller's reverse node
/// and point it at a resolver in one call.
pub const SIG_CLAIM_WITH_RESOLVER: &str = "claimWithResolver(address,address)";

/// `setName(string)` — set the name stored at the caller's reverse node.
pub const SIG_SET_NAME: &str = "setName(string)";

// ═══════════════════════════════════════════════════════════════════════════════
// TREE RECONSTRUCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Label prefix for subdomains whose preimage is unknown.
pub const PLACEHOLDER_LABEL_PREFIX: &str = "unknown";

/// Hex characters of the label hash tail appended to the placeholder.
pub const PLACEHOLDER_TAIL_CHARS: usize = 6;

// ═══════════════════════════════════════════════════════════════════════════════
// SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an Ethereum address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Size of a Keccak-256 hash / ABI word in bytes.
pub const WORD_SIZE: usize = 32;

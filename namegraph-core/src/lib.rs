//! # namegraph Core
//!
//! Core types, errors, and traits for namegraph, an ENS registry explorer.
//!
//! This crate provides the foundational building blocks used by all other
//! namegraph crates:
//!
//! - **Types**: Domain models for addresses, hashes, tree nodes, and events
//! - **Errors**: Comprehensive error types with context
//! - **Constants**: Registry contract signatures and well-known addresses
//! - **Traits**: Collaborator interfaces for the chain transport and the
//!   label preimage service
//! - **Hashing**: EIP-137 namehash over dot-separated names
//!
//! ## Example
//!
//! ```rust
//! use namegraph_core::namehash::namehash;
//!
//! let node = namehash("vault.example.eth");
//! assert_eq!(node, namehash("vault.example.eth")); // pure and deterministic
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod namehash;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{NamegraphError, Result};
pub use namehash::{keccak256, labelhash, namehash, subnode};
pub use traits::*;
pub use types::*;

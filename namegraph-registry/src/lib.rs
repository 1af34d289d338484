//! # namegraph Registry
//!
//! Typed access to the ENS registry and resolver contracts over a
//! wallet-connected JSON-RPC provider.
//!
//! - [`HttpTransport`]: JSON-RPC 2.0 over HTTP, the production
//!   [`ChainTransport`](namegraph_core::ChainTransport)
//! - [`RegistryClient`]: ownership, resolver, and record operations
//! - [`ReverseRegistrar`]: reverse-record (address → name) management
//! - [`abi`]: the minimal ABI encoding the above need
//!
//! No retries, no confirmation tracking: writes return pending
//! transaction hashes, failures surface immediately.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
mod client;
mod reverse;
mod transport;

pub use client::{RegistryClient, RegistryConfig};
pub use reverse::ReverseRegistrar;
pub use transport::{HttpTransport, RpcConfig};

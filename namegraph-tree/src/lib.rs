//! # namegraph Tree
//!
//! Reconstruction of the subdomain tree under a registered name.
//!
//! The registry never stores a list of children; it only emits
//! `NewOwner` events. [`TreeBuilder`] walks those historical logs,
//! resolves hashed labels through a preimage collaborator, decorates
//! every surviving subdomain with current ownership and resolver state,
//! and assembles the result into an owned recursive
//! [`DomainNode`](namegraph_core::DomainNode) snapshot.
//!
//! ## Example
//!
//! ```rust,ignore
//! use namegraph_tree::{TreeBuilder, HttpPreimageClient};
//!
//! let builder = TreeBuilder::new(registry, Arc::new(preimage));
//! let tree = builder.build_tree("example.eth").await?;
//! println!("{} names", tree.size());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod preimage;

pub use builder::TreeBuilder;
pub use preimage::{HttpPreimageClient, PreimageConfig, StaticLabelTable};

//! Domain models for namegraph.

mod address;
mod event;
mod node;
mod tx;

pub use address::{Address, Hash256, TxHash};
pub use event::{LogFilter, RawLog, SubdomainEvent};
pub use node::{placeholder_label, DomainNode, ResolverDetail};
pub use tx::{CreatedSubdomain, DeleteReport, DeleteStep, ReverseRecord};

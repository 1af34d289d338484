//! Error types for namegraph.
//!
//! One `thiserror` hierarchy shared across the workspace. Chain-call
//! failures are never retried at this layer; they surface to the caller
//! with the underlying transport or revert reason attached.

use thiserror::Error;

use crate::types::{DeleteReport, DeleteStep};

/// Result type alias using `NamegraphError`.
pub type Result<T> = std::result::Result<T, NamegraphError>;

/// Main error type for all namegraph operations.
#[derive(Debug, Error)]
pub enum NamegraphError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CHAIN ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A contract read or write failed, carrying the transport error or
    /// the contract's revert reason.
    #[error("chain call {method} failed: {reason}")]
    ChainCall {
        /// The JSON-RPC method or contract function that failed.
        method: String,
        /// Transport error or revert reason.
        reason: String,
    },

    /// The JSON-RPC envelope was malformed or missing its result.
    #[error("RPC protocol error: {0}")]
    Rpc(String),

    /// HTTP-level transport failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The connected provider exposes no signing account.
    #[error("no active account available from the provider")]
    NoAccount,

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// The operation reads or writes through a resolver, but the node has
    /// none set.
    #[error("no resolver set for '{0}'")]
    NoResolver(String),

    /// The multi-step subdomain deletion stopped partway; the report
    /// records which writes were already submitted.
    #[error("deletion of '{name}' interrupted at {step}: {reason}")]
    DeleteInterrupted {
        /// The subdomain being deleted.
        name: String,
        /// The step that failed.
        step: DeleteStep,
        /// Writes submitted before the failure.
        report: DeleteReport,
        /// The underlying failure.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // ENCODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Contract output did not decode as the expected ABI type.
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// Invalid hex encoding.
    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NamegraphError {
    /// Returns true if this error is transient (caller may retry; this
    /// layer never does).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NamegraphError::ChainCall { .. }
                | NamegraphError::Rpc(_)
                | NamegraphError::Http(_)
        )
    }

    /// Returns true if this error reports bad caller input rather than a
    /// chain or transport condition.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            NamegraphError::Validation(_) | NamegraphError::Config(_) | NamegraphError::Hex(_)
        )
    }
}

//! Results of registry write operations.

use serde::{Deserialize, Serialize};

use crate::types::{Address, TxHash};

/// Result of creating a subdomain under the active account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSubdomain {
    /// Pending transaction that creates the subnode.
    pub tx: TxHash,
    /// Owner the subnode was assigned to (the active account).
    pub owner: Address,
}

/// A record read back from an address's reverse node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReverseRecord {
    /// The human-readable name stored at the reverse node.
    pub name: String,
    /// The resolver contract backing the record.
    pub resolver_addr: Address,
}

/// One step of the subdomain deletion sequence.
///
/// Deletion is a multi-call sequence with no rollback: the resolver must
/// be cleared by the current controller before the final ownership
/// relinquish, otherwise a dangling resolver reference persists against
/// an ownerless node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteStep {
    /// Reassign the subnode to the active account, taking control back
    /// from any delegate so the resolver clear is authorized.
    ReclaimOwnership,
    /// Point the subnode at the zero resolver.
    ClearResolver,
    /// Assign the subnode to the zero address.
    Relinquish,
}

impl std::fmt::Display for DeleteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeleteStep::ReclaimOwnership => "reclaim-ownership",
            DeleteStep::ClearResolver => "clear-resolver",
            DeleteStep::Relinquish => "relinquish",
        };
        write!(f, "{s}")
    }
}

/// Per-step outcome of a subdomain deletion.
///
/// The sequence is not transactional. Callers observe which writes were
/// submitted through this report; when a step fails the partial report
/// travels inside the error, and calling the deletion again performs only
/// the remaining steps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    /// Ownership reassignment to the active account, when it was needed.
    pub reclaimed_ownership: Option<TxHash>,
    /// Resolver clear, when the subnode had a resolver.
    pub cleared_resolver: Option<TxHash>,
    /// The final owner-to-zero write.
    pub relinquished: Option<TxHash>,
}

impl DeleteReport {
    /// True once the final relinquish was submitted.
    pub fn is_complete(&self) -> bool {
        self.relinquished.is_some()
    }

    /// The steps that were submitted, in execution order.
    pub fn completed_steps(&self) -> Vec<DeleteStep> {
        let mut steps = Vec::new();
        if self.reclaimed_ownership.is_some() {
            steps.push(DeleteStep::ReclaimOwnership);
        }
        if self.cleared_resolver.is_some() {
            steps.push(DeleteStep::ClearResolver);
        }
        if self.relinquished.is_some() {
            steps.push(DeleteStep::Relinquish);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash256;

    #[test]
    fn test_empty_report_incomplete() {
        let report = DeleteReport::default();
        assert!(!report.is_complete());
        assert!(report.completed_steps().is_empty());
    }

    #[test]
    fn test_report_tracks_steps_in_order() {
        let report = DeleteReport {
            reclaimed_ownership: Some(Hash256::new([1; 32])),
            cleared_resolver: Some(Hash256::new([2; 32])),
            relinquished: None,
        };
        assert!(!report.is_complete());
        assert_eq!(
            report.completed_steps(),
            vec![DeleteStep::ReclaimOwnership, DeleteStep::ClearResolver]
        );
    }

    #[test]
    fn test_relinquish_completes() {
        let report = DeleteReport {
            reclaimed_ownership: None,
            cleared_resolver: None,
            relinquished: Some(Hash256::new([3; 32])),
        };
        assert!(report.is_complete());
        assert_eq!(report.completed_steps(), vec![DeleteStep::Relinquish]);
    }
}

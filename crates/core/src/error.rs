//! Error types for the transaction kernel
//!
//! Race losses (stale handles, already-closed transactions) are not errors in
//! this system; they are represented as `false`/`None` results at the call
//! sites that can lose them. The variants here cover genuine misuse and the
//! termination verdict a transaction's own thread observes at a safe point.

use crate::types::TerminationReason;
use thiserror::Error;

/// Errors raised by the transaction-lifecycle core
#[derive(Debug, Error)]
pub enum KernelError {
    /// Operation is invalid for the transaction's current lifecycle state.
    ///
    /// This is programmer misuse (e.g. `begin` on an open object), not a
    /// user-facing condition.
    #[error("illegal transaction state: {0}")]
    IllegalState(String),

    /// The transaction was marked for termination and refused further work.
    ///
    /// Surfaced to the transaction's own thread at its next safe point, with
    /// the reason recorded by the first termination request.
    #[error("transaction terminated: {0}")]
    TransactionTerminated(TerminationReason),
}

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;

impl KernelError {
    /// Build an [`KernelError::IllegalState`] from any displayable detail
    pub fn illegal_state(detail: impl std::fmt::Display) -> Self {
        KernelError::IllegalState(detail.to_string())
    }

    /// Check if this error reports a termination verdict
    pub fn is_terminated(&self) -> bool {
        matches!(self, KernelError::TransactionTerminated(_))
    }

    /// Check if this error reports caller misuse
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, KernelError::IllegalState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        let e = KernelError::illegal_state("begin on OPEN transaction");
        assert!(e.is_illegal_state());
        assert!(!e.is_terminated());

        let e = KernelError::TransactionTerminated(TerminationReason::Timeout);
        assert!(e.is_terminated());
    }

    #[test]
    fn test_error_messages_carry_reason_code() {
        let e = KernelError::TransactionTerminated(TerminationReason::Deadlock);
        assert!(e.to_string().contains("DeadlockDetected"));
    }
}

//! Unified error types for vertexdb.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use thiserror::Error;
use vertex_core::types::TerminationReason;
use vertex_core::KernelError;

/// All vertexdb errors.
///
/// This is the canonical error type for kernel operations at the public
/// surface. Race losses (stale handles, already-finished transactions) are
/// deliberately *not* errors anywhere in this crate; they come back as
/// `false`/`None` from the operations that can lose them.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation invalid for the transaction's lifecycle state (caller misuse)
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The transaction was terminated; the reason says why
    #[error("transaction terminated: {0}")]
    Terminated(TerminationReason),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for vertexdb operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a termination verdict.
    ///
    /// A terminated transaction may be retried by the client once the
    /// condition that killed it (timeout, deadlock victim, shutdown) has
    /// passed.
    pub fn is_terminated(&self) -> bool {
        matches!(self, Error::Terminated(_))
    }

    /// Check if this error reports caller misuse.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::IllegalState(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

// Convert from internal kernel errors
impl From<KernelError> for Error {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::IllegalState(msg) => Error::IllegalState(msg),
            KernelError::TransactionTerminated(reason) => Error::Terminated(reason),
        }
    }
}

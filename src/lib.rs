//! # vertexdb
//!
//! Embedded transactional graph database kernel.
//!
//! This crate is the transaction-lifecycle core: it creates, tracks, exposes
//! and safely terminates in-flight transactions while the backing transaction
//! objects are pooled and reused for performance. Monitoring code works
//! through generation-stamped handles that can never alias a recycled slot's
//! next occupant — a stale handle fails closed instead.
//!
//! ## Quick Start
//!
//! ```
//! use vertexdb::prelude::*;
//!
//! # fn main() -> vertexdb::Result<()> {
//! let kernel = Kernel::new();
//!
//! // the executor's side
//! let (tx, handle) = kernel.begin_transaction(TransactionType::Explicit, AccessMode::Write)?;
//!
//! // the monitoring side: enumerate, inspect, request termination
//! for h in kernel.list_open_transaction_handles() {
//!     if h.mode().allows_writes() {
//!         h.mark_for_termination(TerminationReason::Terminated);
//!     }
//! }
//!
//! // the executor observes the verdict at its next safe point
//! assert!(tx.commit().is_err());
//! drop(handle);
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety across pooling
//!
//! Backing objects are recycled across logical transactions; each reuse gets
//! a strictly greater generation stamp. A [`TransactionHandle`] carries the
//! stamp it was issued for and re-validates it on every live operation, so
//! termination requests and liveness checks either reach exactly the logical
//! transaction they were aimed at or return `false`.

#![warn(missing_docs)]

mod error;
mod kernel;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use kernel::{Kernel, KernelBuilder, KernelConfig, KernelStats};

// Re-export the transaction core
pub use vertex_txn::{KernelTransaction, TransactionHandle, TransactionStatus};

// Re-export core types and boundaries
pub use vertex_core::traits::{CommitTracker, InMemoryCommitTracker};
pub use vertex_core::types::{
    AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType,
};
pub use vertex_core::KernelError;

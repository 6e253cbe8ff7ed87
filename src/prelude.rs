//! Convenient imports for vertexdb.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use vertexdb::prelude::*;
//!
//! let kernel = Kernel::new();
//! let (tx, _handle) = kernel
//!     .begin_transaction(TransactionType::Implicit, AccessMode::Read)
//!     .unwrap();
//! tx.commit().unwrap();
//! ```

// Main entry point
pub use crate::kernel::{Kernel, KernelBuilder, KernelConfig, KernelStats};

// Error handling
pub use crate::error::{Error, Result};
pub use vertex_core::KernelError;

// Transaction core
pub use vertex_txn::{KernelTransaction, TransactionHandle, TransactionStatus};

// Core types
pub use vertex_core::types::{
    AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType,
};

// Commit-layer boundary
pub use vertex_core::traits::{CommitTracker, InMemoryCommitTracker};

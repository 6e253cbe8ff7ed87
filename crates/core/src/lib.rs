//! Core types and boundaries for the vertexdb transaction kernel
//!
//! This crate defines:
//! - The fundamental value types (generation stamps, access modes,
//!   termination reasons, commit snapshot markers)
//! - The kernel error type and result alias
//! - The [`traits::CommitTracker`] boundary to the store/commit layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{KernelError, Result};
pub use traits::{CommitTracker, InMemoryCommitTracker};
pub use types::{AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType};

//! Transaction lifecycle core for vertexdb
//!
//! This crate implements the in-flight transaction machinery:
//! - [`state`]: the lifecycle record and status machine
//! - [`pool`]: recycling of backing objects with monotonic generation stamps
//! - [`transaction`]: the live unit of work ([`KernelTransaction`])
//! - [`handle`]: immutable, stamp-validated monitoring views
//! - [`registry`]: the concurrent directory of live transactions
//!
//! # The reuse hazard
//!
//! Backing objects are pooled: the object behind logical transaction N is
//! recycled for transaction N+1. Every external reference therefore carries
//! the generation stamp it was issued for, and every dereference re-validates
//! that stamp against the live object before acting. A reference to a
//! finished transaction fails closed (`false`/`None`); it can never alias
//! the slot's next occupant.
//!
//! # Lock order
//!
//! Registry shard, then transaction state. The state lock is never held
//! across a registry or pool call.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handle;
pub mod pool;
pub mod registry;
pub mod state;
pub mod transaction;

pub use handle::TransactionHandle;
pub use pool::{TransactionObjectPool, DEFAULT_POOL_CAPACITY};
pub use registry::TransactionRegistry;
pub use state::TransactionStatus;
pub use transaction::KernelTransaction;

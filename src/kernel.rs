//! Kernel entry point for vertexdb.
//!
//! This module provides the [`Kernel`] struct, the single creation entry
//! point for transactions, and the monitoring surface over the live
//! transaction registry.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use vertex_core::traits::{CommitTracker, InMemoryCommitTracker};
use vertex_core::types::{AccessMode, Generation, TerminationReason, TransactionType};
use vertex_txn::{
    KernelTransaction, TransactionHandle, TransactionObjectPool, TransactionRegistry,
    DEFAULT_POOL_CAPACITY,
};

/// The vertexdb transaction kernel.
///
/// Owns the object pool, the live-transaction registry and the commit-layer
/// boundary. Every transaction enters the system through
/// [`begin_transaction`], which acquires a pooled backing object, registers
/// it under a fresh generation stamp and mints the monitoring handle.
///
/// # Example
///
/// ```
/// use vertexdb::prelude::*;
///
/// # fn main() -> vertexdb::Result<()> {
/// let kernel = Kernel::new();
///
/// let (tx, handle) = kernel.begin_transaction(TransactionType::Explicit, AccessMode::Write)?;
/// assert!(handle.is_open());
///
/// // administrative code asks the transaction to stop
/// handle.mark_for_termination(TerminationReason::Timeout);
///
/// // the owning executor observes the verdict at its safe point
/// let err = tx.commit().unwrap_err();
/// assert!(err.is_terminated());
/// # Ok(())
/// # }
/// ```
///
/// [`begin_transaction`]: Kernel::begin_transaction
pub struct Kernel {
    registry: Arc<TransactionRegistry>,
    pool: Arc<TransactionObjectPool>,
    commits: Arc<dyn CommitTracker>,
    started: AtomicU64,
}

impl Kernel {
    /// Create a kernel with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for kernel configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use vertexdb::Kernel;
    ///
    /// let kernel = Kernel::builder().pool_capacity(4).build();
    /// assert_eq!(kernel.stats().pool_capacity, 4);
    /// ```
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Begin a new transaction.
    ///
    /// Acquires a backing object from the pool, registers it in the live
    /// directory under its fresh generation stamp and mints the monitoring
    /// handle — in that order, so the stamp is registered before it is ever
    /// published to a caller.
    ///
    /// Returns the transaction for the owning executor together with the
    /// handle for monitoring/administrative use.
    pub fn begin_transaction(
        &self,
        tx_type: TransactionType,
        access_mode: AccessMode,
    ) -> Result<(Arc<KernelTransaction>, TransactionHandle)> {
        let snapshot = self.commits.last_committed();
        let tx = self.pool.acquire(access_mode, tx_type, snapshot)?;
        let generation = tx.generation();
        self.registry.register(generation, Arc::clone(&tx));
        self.started.fetch_add(1, Ordering::Relaxed);

        let handle = self.registry.handle_for(generation).ok_or_else(|| {
            Error::Internal(format!("freshly registered {generation} has no handle"))
        })?;
        tracing::debug!(
            generation = generation.as_u64(),
            mode = %access_mode,
            "transaction started"
        );
        Ok((tx, handle))
    }

    /// Enumerate all live transactions as freshly minted handles.
    ///
    /// The snapshot never contains a transaction that already finished its
    /// close, and contains every transaction between registration and
    /// deregistration.
    pub fn list_open_transaction_handles(&self) -> Vec<TransactionHandle> {
        self.registry.list_open()
    }

    /// Mint a fresh handle for one live transaction, by stamp.
    ///
    /// `None` when the transaction already finished.
    pub fn transaction_handle(&self, generation: Generation) -> Option<TransactionHandle> {
        self.registry.handle_for(generation)
    }

    /// Mark every live transaction for termination.
    ///
    /// Cooperative: each transaction observes the verdict at its own safe
    /// point. Returns the number of transactions marked.
    pub fn terminate_all(&self, reason: TerminationReason) -> usize {
        let marked = self.registry.mark_all_for_termination(reason);
        tracing::debug!(count = marked, reason = %reason, "terminated all live transactions");
        marked
    }

    /// Ask every live transaction to stop because the kernel is going down.
    ///
    /// Termination stays cooperative; callers that need a quiescent kernel
    /// wait for [`active_count`] to reach zero after this.
    ///
    /// [`active_count`]: Kernel::active_count
    pub fn shutdown(&self) -> usize {
        self.terminate_all(TerminationReason::ShuttingDown)
    }

    /// Number of currently live transactions.
    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Current kernel statistics.
    pub fn stats(&self) -> KernelStats {
        KernelStats {
            active_transactions: self.registry.len(),
            idle_pooled_objects: self.pool.idle_count(),
            allocated_objects: self.pool.created_total(),
            started_total: self.started.load(Ordering::Relaxed),
            pool_capacity: self.pool.capacity(),
        }
    }

    /// The commit-layer boundary this kernel reads snapshot markers from.
    pub fn commit_tracker(&self) -> Arc<dyn CommitTracker> {
        Arc::clone(&self.commits)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`Kernel`].
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Maximum number of closed transaction objects retained for reuse
    pub pool_capacity: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

/// Builder for [`Kernel`] configuration.
pub struct KernelBuilder {
    config: KernelConfig,
    commits: Option<Arc<dyn CommitTracker>>,
}

impl KernelBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: KernelConfig::default(),
            commits: None,
        }
    }

    /// Set how many closed transaction objects the pool retains.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.config.pool_capacity = capacity;
        self
    }

    /// Use a custom commit tracker instead of the embedded in-memory one.
    pub fn commit_tracker(mut self, tracker: Arc<dyn CommitTracker>) -> Self {
        self.commits = Some(tracker);
        self
    }

    /// Build the kernel.
    pub fn build(self) -> Kernel {
        let registry = Arc::new(TransactionRegistry::new());
        let pool = Arc::new(TransactionObjectPool::new(
            self.config.pool_capacity,
            &registry,
        ));
        let commits = self
            .commits
            .unwrap_or_else(|| Arc::new(InMemoryCommitTracker::new()));
        Kernel {
            registry,
            pool,
            commits,
            started: AtomicU64::new(0),
        }
    }
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel statistics for monitoring.
#[derive(Debug, Clone)]
pub struct KernelStats {
    /// Transactions currently live
    pub active_transactions: usize,
    /// Closed objects currently held by the pool
    pub idle_pooled_objects: usize,
    /// Backing objects ever allocated
    pub allocated_objects: u64,
    /// Transactions ever started
    pub started_total: u64,
    /// Pool retention capacity
    pub pool_capacity: usize,
}

impl std::fmt::Display for KernelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Kernel Stats: {} active, {} idle pooled (cap {}), {} allocated, {} started",
            self.active_transactions,
            self.idle_pooled_objects,
            self.pool_capacity,
            self.allocated_objects,
            self.started_total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_registers_and_mints_handle() {
        let kernel = Kernel::new();
        let (tx, handle) = kernel
            .begin_transaction(TransactionType::Explicit, AccessMode::Write)
            .unwrap();

        assert_eq!(kernel.active_count(), 1);
        assert_eq!(handle.generation(), tx.generation());
        assert!(handle.is_underlying_transaction(&tx));

        tx.close().unwrap();
        assert_eq!(kernel.active_count(), 0);
    }

    #[test]
    fn test_stats_track_pooling() {
        let kernel = Kernel::builder().pool_capacity(2).build();

        let (tx, _h) = kernel
            .begin_transaction(TransactionType::Implicit, AccessMode::Read)
            .unwrap();
        tx.close().unwrap();

        let stats = kernel.stats();
        assert_eq!(stats.active_transactions, 0);
        assert_eq!(stats.idle_pooled_objects, 1);
        assert_eq!(stats.allocated_objects, 1);
        assert_eq!(stats.started_total, 1);
        assert_eq!(stats.pool_capacity, 2);
    }

    #[test]
    fn test_terminate_all_marks_every_live_transaction() {
        let kernel = Kernel::new();
        let (tx1, _h1) = kernel
            .begin_transaction(TransactionType::Explicit, AccessMode::Write)
            .unwrap();
        let (tx2, _h2) = kernel
            .begin_transaction(TransactionType::Explicit, AccessMode::Read)
            .unwrap();

        assert_eq!(kernel.shutdown(), 2);
        assert_eq!(
            tx1.termination_reason(),
            Some(TerminationReason::ShuttingDown)
        );
        assert!(tx2.commit().unwrap_err().is_terminated());
        assert_eq!(kernel.active_count(), 1, "tx1 has not reached a safe point yet");

        tx1.rollback().unwrap();
        assert_eq!(kernel.active_count(), 0);
    }

    #[test]
    fn test_transaction_handle_by_stamp() {
        let kernel = Kernel::new();
        let (tx, handle) = kernel
            .begin_transaction(TransactionType::Explicit, AccessMode::Write)
            .unwrap();

        let fresh = kernel.transaction_handle(handle.generation()).unwrap();
        assert_eq!(fresh.generation(), handle.generation());

        tx.close().unwrap();
        assert!(kernel.transaction_handle(handle.generation()).is_none());
    }
}

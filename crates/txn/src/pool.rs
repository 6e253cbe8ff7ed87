//! Pooling of backing transaction objects
//!
//! Transaction objects are reset, not reallocated, across logical
//! transactions. The pool is the single source of generation stamps: every
//! `begin` on one of its objects draws the next stamp from the pool's shared
//! counter inside the same critical section that resets the state, so an
//! object is never observable with a new stamp and stale state.
//!
//! Retention is bounded; allocation is not. `acquire` never fails for
//! capacity reasons — when the idle list is empty a fresh object is
//! allocated, and `release` simply drops objects beyond `capacity`.

use crate::registry::TransactionRegistry;
use crate::transaction::KernelTransaction;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use vertex_core::types::{AccessMode, CommitSnapshot, Generation, TransactionType};
use vertex_core::Result;

/// Default number of closed transaction objects retained for reuse
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Monotonic source of generation stamps, shared by all objects of one pool
///
/// Stamps start at 1 and strictly increase; a stamp is never reissued for
/// the lifetime of the pool.
#[derive(Debug)]
pub(crate) struct GenerationSource {
    next: AtomicU64,
}

impl GenerationSource {
    fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Draw the next stamp
    pub(crate) fn next_stamp(&self) -> Generation {
        Generation::new(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Number of stamps issued so far
    pub(crate) fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

/// Recycler of [`KernelTransaction`] backing objects
///
/// # Thread Safety
///
/// `acquire` and `release` only lock the idle list for a pop/push; the
/// object's own reset happens under its state lock inside `begin`. Two
/// overlapping acquisitions can never hand out the same object because an
/// object enters the idle list only after its close transition.
pub struct TransactionObjectPool {
    /// Closed objects awaiting reuse
    idle: Mutex<Vec<Arc<KernelTransaction>>>,
    /// Maximum number of idle objects retained
    capacity: usize,
    /// Shared stamp source handed to every object this pool allocates
    generations: Arc<GenerationSource>,
    /// Registry that objects deregister from when they close
    registry: Weak<TransactionRegistry>,
    /// Total objects ever allocated by this pool
    created: AtomicU64,
}

impl TransactionObjectPool {
    /// Create a pool retaining up to `capacity` idle objects
    ///
    /// `registry` is the directory the pool's transactions register with; it
    /// is held weakly so the pool never keeps the kernel alive.
    pub fn new(capacity: usize, registry: &Arc<TransactionRegistry>) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            generations: Arc::new(GenerationSource::new()),
            registry: Arc::downgrade(registry),
            created: AtomicU64::new(0),
        }
    }

    /// Acquire a backing object and begin a new logical transaction on it
    ///
    /// Pops an idle (closed) object or allocates a fresh one, then runs
    /// `begin`, which draws the new generation stamp and resets the state in
    /// one critical section. Never returns an object that is currently live.
    pub fn acquire(
        self: &Arc<Self>,
        access_mode: AccessMode,
        tx_type: TransactionType,
        snapshot: CommitSnapshot,
    ) -> Result<Arc<KernelTransaction>> {
        let recycled = self.idle.lock().pop();
        let tx = match recycled {
            Some(tx) => tx,
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                Arc::new(KernelTransaction::new(
                    Arc::clone(&self.generations),
                    self.registry.clone(),
                    Arc::downgrade(self),
                ))
            }
        };
        let generation = tx.begin(access_mode, tx_type, snapshot)?;
        tracing::trace!(generation = generation.as_u64(), "acquired transaction object");
        Ok(tx)
    }

    /// Return a closed object for future reuse
    ///
    /// Only closed objects are retained; a live object is refused (and the
    /// refusal logged) so the idle list can never hand out an object under
    /// two overlapping generations. Beyond `capacity` the object is dropped.
    pub fn release(&self, tx: Arc<KernelTransaction>) {
        if tx.is_open() {
            tracing::warn!(
                generation = tx.generation().as_u64(),
                "refusing to pool a live transaction object"
            );
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(tx);
        } else {
            tracing::trace!("pool at capacity, dropping transaction object");
        }
    }

    /// Number of idle objects currently retained
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Retention capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of objects this pool has allocated
    pub fn created_total(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Raw value of the highest generation stamp issued so far
    pub fn last_issued_generation(&self) -> u64 {
        self.generations.issued()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TransactionRegistry;
    use vertex_core::types::TerminationReason;

    fn pool_with_registry(capacity: usize) -> (Arc<TransactionObjectPool>, Arc<TransactionRegistry>) {
        let registry = Arc::new(TransactionRegistry::new());
        let pool = Arc::new(TransactionObjectPool::new(capacity, &registry));
        (pool, registry)
    }

    fn begin_default(pool: &Arc<TransactionObjectPool>) -> Arc<KernelTransaction> {
        pool.acquire(
            AccessMode::Write,
            TransactionType::Explicit,
            CommitSnapshot::genesis(),
        )
        .unwrap()
    }

    #[test]
    fn test_acquire_allocates_and_begins() {
        let (pool, _registry) = pool_with_registry(4);
        let tx = begin_default(&pool);

        assert!(tx.is_open());
        assert_eq!(tx.generation(), Generation::new(1));
        assert_eq!(pool.created_total(), 1);
    }

    #[test]
    fn test_closed_object_is_reused_with_greater_stamp() {
        let (pool, _registry) = pool_with_registry(4);

        let tx1 = begin_default(&pool);
        let g1 = tx1.generation();
        tx1.close().unwrap();
        assert_eq!(pool.idle_count(), 1);

        let tx2 = begin_default(&pool);
        assert!(
            Arc::ptr_eq(&tx1, &tx2),
            "pool should recycle the backing object"
        );
        assert!(tx2.generation() > g1, "reuse must bump the stamp");
        assert_eq!(pool.created_total(), 1, "no second allocation");
    }

    #[test]
    fn test_stamps_strictly_increase_across_objects() {
        let (pool, _registry) = pool_with_registry(2);

        let mut last = 0;
        for _ in 0..10 {
            let tx = begin_default(&pool);
            let raw = tx.generation().as_u64();
            assert!(raw > last, "stamps must strictly increase");
            last = raw;
            tx.close().unwrap();
        }
    }

    #[test]
    fn test_retention_is_bounded_by_capacity() {
        let (pool, _registry) = pool_with_registry(2);

        let txs: Vec<_> = (0..5).map(|_| begin_default(&pool)).collect();
        for tx in txs {
            tx.close().unwrap();
        }

        assert_eq!(pool.idle_count(), 2, "idle list must not exceed capacity");
        assert_eq!(pool.created_total(), 5);
    }

    #[test]
    fn test_live_object_is_refused() {
        let (pool, _registry) = pool_with_registry(4);
        let tx = begin_default(&pool);

        pool.release(Arc::clone(&tx));
        assert_eq!(pool.idle_count(), 0, "live objects must never be pooled");

        tx.mark_for_termination(TerminationReason::Timeout);
        pool.release(Arc::clone(&tx));
        assert_eq!(
            pool.idle_count(),
            0,
            "termination-requested objects are still live"
        );
    }
}

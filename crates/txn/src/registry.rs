//! Process-wide directory of live transactions
//!
//! Maps active generation stamps to their backing objects. The registry is
//! the only route from a handle back to live state: a stamp resolves iff its
//! logical transaction is still live, so a lookup either finds exactly the
//! transaction the stamp was issued for or fails closed.
//!
//! Register and deregister are the only mutation points. Deregistration is
//! ordered before the object's return to the pool (see
//! [`KernelTransaction::close`]), which is what makes a stale lookup unable
//! to observe a reused object under the old stamp.
//!
//! [`KernelTransaction::close`]: crate::KernelTransaction::close

use crate::handle::TransactionHandle;
use crate::transaction::KernelTransaction;
use dashmap::DashMap;
use std::sync::Arc;
use vertex_core::types::{Generation, TerminationReason};

/// Concurrent map from generation stamp to live transaction
///
/// # Thread Safety
///
/// Backed by a sharded concurrent map: resolution is lock-free for readers
/// and mutation only touches the target shard. Enumeration takes each
/// transaction's own lock briefly to mint a consistent handle; no caller
/// ever holds a transaction lock while touching the map, so the two lock
/// levels cannot invert.
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    live: DashMap<Generation, Arc<KernelTransaction>>,
}

impl TransactionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            live: DashMap::new(),
        }
    }

    /// Register a freshly begun transaction under its stamp
    ///
    /// Called once per `begin`, before the stamp is published to any caller.
    /// A collision is impossible with a monotonic stamp source; if one ever
    /// appears it is a defect worth shouting about, and the newer
    /// registration wins.
    pub fn register(&self, generation: Generation, tx: Arc<KernelTransaction>) {
        if self.live.insert(generation, tx).is_some() {
            tracing::error!(
                generation = generation.as_u64(),
                "generation stamp registered twice"
            );
        }
    }

    /// Remove a stamp from the directory
    ///
    /// Called once per close, after the transition to `Closed` and before
    /// the object is returned to the pool. Returns whether an entry was
    /// removed.
    pub fn deregister(&self, generation: Generation) -> bool {
        self.live.remove(&generation).is_some()
    }

    /// Resolve a stamp to its live transaction
    ///
    /// `None` means the logical transaction already finished — a routine
    /// outcome for stale handles, not an error.
    pub fn resolve(&self, generation: Generation) -> Option<Arc<KernelTransaction>> {
        self.live
            .get(&generation)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Mint a fresh handle for a registered stamp
    ///
    /// `None` when the stamp is no longer live. The stamp is re-checked on
    /// the minted handle, so a slot that closes and is reused between the
    /// lookup and the mint can never yield a handle for the wrong occupant.
    pub fn handle_for(self: &Arc<Self>, generation: Generation) -> Option<TransactionHandle> {
        self.resolve(generation)
            .and_then(|tx| tx.snapshot_handle(self))
            .filter(|handle| handle.generation() == generation)
    }

    /// Snapshot-enumerate all live transactions as freshly minted handles
    ///
    /// Each handle copies the transaction's current state under its lock.
    /// Entries that race to `Closed` mid-enumeration are skipped.
    pub fn list_open(self: &Arc<Self>) -> Vec<TransactionHandle> {
        self.live
            .iter()
            .filter_map(|entry| entry.value().snapshot_handle(self))
            .collect()
    }

    /// Mark every live transaction for termination
    ///
    /// Stamp-checked per entry, so a slot that closes and is reused while we
    /// iterate is left alone. Returns the number of transactions marked.
    pub fn mark_all_for_termination(&self, reason: TerminationReason) -> usize {
        self.live
            .iter()
            .filter(|entry| entry.value().mark_for_termination_if(*entry.key(), reason))
            .count()
    }

    /// Number of currently registered transactions
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no transaction is currently registered
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

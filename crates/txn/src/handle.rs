//! Capability-scoped view of one logical transaction
//!
//! A [`TransactionHandle`] is minted at begin time (and by registry
//! enumeration) for monitoring and administration code: it can inspect the
//! transaction's start metadata and request termination, but cannot mutate
//! transaction data, block the transaction's close, or keep its backing
//! object alive.
//!
//! The handle's fields are immutable copies. Its only live operations —
//! [`is_open`] and [`mark_for_termination`] — resolve through the registry
//! and re-validate the generation stamp against the backing object before
//! acting, because that object may have been closed and reassigned to an
//! unrelated transaction since the handle was issued. A stale handle fails
//! closed: `false`, never a panic, never the new occupant's data.
//!
//! [`is_open`]: TransactionHandle::is_open
//! [`mark_for_termination`]: TransactionHandle::mark_for_termination

use crate::registry::TransactionRegistry;
use crate::transaction::KernelTransaction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Weak};
use vertex_core::types::{
    AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType,
};

/// Immutable, non-owning view of a specific logical transaction
///
/// Cheap to clone and safe to hold indefinitely: once the underlying logical
/// transaction finishes, every mutating operation returns `false` and the
/// snapshot accessors keep answering from the copied state.
///
/// Serializes its snapshot portion only; the live references are skipped.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHandle {
    generation: Generation,
    snapshot: CommitSnapshot,
    local_start_time: DateTime<Utc>,
    access_mode: AccessMode,
    tx_type: TransactionType,
    termination_reason: Option<TerminationReason>,
    #[serde(skip_serializing)]
    registry: Arc<TransactionRegistry>,
    #[serde(skip_serializing)]
    slot: Weak<KernelTransaction>,
}

impl TransactionHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        generation: Generation,
        snapshot: CommitSnapshot,
        local_start_time: DateTime<Utc>,
        access_mode: AccessMode,
        tx_type: TransactionType,
        termination_reason: Option<TerminationReason>,
        registry: Arc<TransactionRegistry>,
        slot: Weak<KernelTransaction>,
    ) -> Self {
        Self {
            generation,
            snapshot,
            local_start_time,
            access_mode,
            tx_type,
            termination_reason,
            registry,
            slot,
        }
    }

    /// The generation stamp this handle was issued for
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Id of the last transaction committed to the store when the underlying
    /// transaction started
    pub fn last_transaction_id_when_started(&self) -> u64 {
        self.snapshot.last_committed_tx_id
    }

    /// Timestamp of the last transaction committed to the store when the
    /// underlying transaction started
    pub fn last_transaction_timestamp_when_started(&self) -> DateTime<Utc> {
        self.snapshot.last_committed_tx_timestamp
    }

    /// Wall-clock time the underlying transaction began
    pub fn local_start_time(&self) -> DateTime<Utc> {
        self.local_start_time
    }

    /// Access mode the underlying transaction had when the handle was issued
    pub fn mode(&self) -> AccessMode {
        self.access_mode
    }

    /// How the underlying transaction was opened
    pub fn transaction_type(&self) -> TransactionType {
        self.tx_type
    }

    /// Termination reason the underlying transaction had when the handle was
    /// issued
    ///
    /// This is an issue-time snapshot like every other accessor here, not a
    /// live read — registry enumeration mints fresh handles when current
    /// state is wanted.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.termination_reason
    }

    /// Check whether the underlying transaction is still live
    ///
    /// Resolves through the registry. `false` when the stamp is no longer
    /// registered (already closed, possibly reused) or the backing object's
    /// stamp no longer matches.
    pub fn is_open(&self) -> bool {
        match self.registry.resolve(self.generation) {
            Some(tx) => tx.is_open_for(self.generation),
            None => false,
        }
    }

    /// Request termination of the underlying transaction
    ///
    /// Returns `true` when the live transaction was (or already is) marked;
    /// `false` when this handle is stale — the logical transaction it was
    /// issued for is gone, and any new occupant of the backing object is
    /// left untouched.
    pub fn mark_for_termination(&self, reason: TerminationReason) -> bool {
        match self.registry.resolve(self.generation) {
            Some(tx) => tx.mark_for_termination_if(self.generation, reason),
            None => {
                tracing::trace!(
                    generation = self.generation.as_u64(),
                    "termination request on stale handle"
                );
                false
            }
        }
    }

    /// Check whether `tx` is the same logical transaction this handle was
    /// issued for
    ///
    /// Lets a caller that obtained a [`KernelTransaction`] reference through
    /// another route confirm it is not a later occupant of the same pooled
    /// slot: same backing object *and* same stamp.
    pub fn is_underlying_transaction(&self, tx: &KernelTransaction) -> bool {
        std::ptr::eq(self.slot.as_ptr(), tx) && tx.generation() == self.generation
    }
}

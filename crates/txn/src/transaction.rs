//! The live, in-progress unit of work
//!
//! A [`KernelTransaction`] owns one lifecycle record and carries the
//! generation stamp of its current occupancy. The backing object outlives
//! any single logical transaction: after `close` the pool may reset it for a
//! new occupant under a strictly greater stamp.
//!
//! # Thread Safety
//!
//! Every transition is a short critical section under the transaction's own
//! lock. Two rules keep the whole core deadlock-free and race-free:
//!
//! - The state lock is never held across a registry or pool call.
//! - Handle-mediated mutation re-validates the expected generation stamp
//!   inside the same critical section as the transition, so a request aimed
//!   at a previous occupant of this object can never touch the current one.

use crate::handle::TransactionHandle;
use crate::pool::{GenerationSource, TransactionObjectPool};
use crate::registry::TransactionRegistry;
use crate::state::{TransactionState, TransactionStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use vertex_core::types::{
    AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType,
};
use vertex_core::{KernelError, Result};

/// A pooled transaction object and the logical transaction it currently backs
///
/// Obtained from [`TransactionObjectPool::acquire`]; completed with
/// [`commit`], [`rollback`] or [`close`] by the owning executor. Monitoring
/// code never holds a `KernelTransaction` directly — it works through
/// [`TransactionHandle`]s, which re-validate the generation stamp on every
/// live operation.
///
/// [`commit`]: KernelTransaction::commit
/// [`rollback`]: KernelTransaction::rollback
/// [`close`]: KernelTransaction::close
#[derive(Debug)]
pub struct KernelTransaction {
    /// Stamp source shared with the pool that allocated this object
    generations: Arc<GenerationSource>,
    /// Directory to deregister from on close
    registry: Weak<TransactionRegistry>,
    /// Pool to return to on close
    pool: Weak<TransactionObjectPool>,
    /// The guarded lifecycle record
    state: Mutex<TransactionState>,
}

impl KernelTransaction {
    pub(crate) fn new(
        generations: Arc<GenerationSource>,
        registry: Weak<TransactionRegistry>,
        pool: Weak<TransactionObjectPool>,
    ) -> Self {
        Self {
            generations,
            registry,
            pool,
            state: Mutex::new(TransactionState::unused()),
        }
    }

    /// Begin a new logical transaction on this object
    ///
    /// Valid only from `NotStarted` or `Closed`; anything else is caller
    /// misuse and fails with [`KernelError::IllegalState`]. The new stamp is
    /// drawn and the state reset in one critical section, so no observer can
    /// see the stamp without the reset or the reset without the stamp.
    pub(crate) fn begin(
        &self,
        access_mode: AccessMode,
        tx_type: TransactionType,
        snapshot: CommitSnapshot,
    ) -> Result<Generation> {
        let generation = {
            let mut state = self.state.lock();
            if !state.status.can_begin() {
                return Err(KernelError::illegal_state(format!(
                    "begin on {} transaction",
                    state.status
                )));
            }
            let generation = self.generations.next_stamp();
            state.reset_for(generation, access_mode, tx_type, snapshot);
            generation
        };
        tracing::debug!(
            generation = generation.as_u64(),
            mode = %access_mode,
            tx_type = %tx_type,
            "transaction began"
        );
        Ok(generation)
    }

    /// Request cooperative termination of the current logical transaction
    ///
    /// Safe from any thread. Returns `true` when the transaction is live and
    /// now marked (the first caller's reason is kept), `false` when it has
    /// already finished. Callers holding only a [`TransactionHandle`] go
    /// through the stamp-checked path instead; this unverified variant is for
    /// the owner and the kernel, which hold the current occupant by
    /// construction.
    pub fn mark_for_termination(&self, reason: TerminationReason) -> bool {
        let marked = self.state.lock().request_termination(reason);
        if marked {
            tracing::debug!(
                generation = self.generation().as_u64(),
                reason = %reason,
                "transaction marked for termination"
            );
        }
        marked
    }

    /// Stamp-checked termination request
    ///
    /// Marks the transaction only if `expected` is still the live stamp,
    /// comparing inside the same critical section as the transition. A
    /// mismatch means the caller's handle refers to a previous occupant of
    /// this object; the request is dropped and the current occupant is
    /// untouched.
    pub fn mark_for_termination_if(
        &self,
        expected: Generation,
        reason: TerminationReason,
    ) -> bool {
        let marked = {
            let mut state = self.state.lock();
            if state.generation != expected {
                return false;
            }
            state.request_termination(reason)
        };
        if marked {
            tracing::debug!(
                generation = expected.as_u64(),
                reason = %reason,
                "transaction marked for termination via handle"
            );
        }
        marked
    }

    /// Complete the transaction successfully
    ///
    /// This is the termination safe point: if a termination request arrived
    /// while the transaction was open, commit refuses with the recorded
    /// reason and the transaction closes through the rollback path instead.
    /// Either way the transaction ends `Closed`, deregistered and back in
    /// the pool.
    ///
    /// The write pipeline itself is owned by the surrounding engine; at this
    /// layer commit is the lifecycle transition only.
    pub fn commit(self: &Arc<Self>) -> Result<()> {
        let (generation, verdict) = {
            let mut state = self.state.lock();
            match state.status {
                TransactionStatus::Open => {
                    state.close();
                    (state.generation, Ok(()))
                }
                TransactionStatus::TerminationRequested => {
                    let reason = state
                        .termination_reason
                        .unwrap_or(TerminationReason::Terminated);
                    state.close();
                    (
                        state.generation,
                        Err(KernelError::TransactionTerminated(reason)),
                    )
                }
                status => {
                    return Err(KernelError::illegal_state(format!(
                        "commit on {} transaction",
                        status
                    )));
                }
            }
        };
        self.retire(generation);
        match &verdict {
            Ok(()) => {
                tracing::debug!(generation = generation.as_u64(), "transaction committed")
            }
            Err(_) => tracing::warn!(
                generation = generation.as_u64(),
                "commit refused: transaction was terminated"
            ),
        }
        verdict
    }

    /// Abort the transaction and discard its work
    ///
    /// Valid on a live transaction (including one marked for termination —
    /// rolling back *is* the cooperative response). Ends `Closed`,
    /// deregistered and back in the pool.
    pub fn rollback(self: &Arc<Self>) -> Result<()> {
        let generation = {
            let mut state = self.state.lock();
            if !state.status.is_open() {
                return Err(KernelError::illegal_state(format!(
                    "rollback on {} transaction",
                    state.status
                )));
            }
            state.close();
            state.generation
        };
        self.retire(generation);
        tracing::debug!(generation = generation.as_u64(), "transaction rolled back");
        Ok(())
    }

    /// Release the transaction, discarding any uncommitted work
    ///
    /// Callable only by the owning executor. Transitions a live transaction
    /// to `Closed`, deregisters it and returns the object to the pool. A
    /// second close of the same occupancy is a no-op; close of an object
    /// that never began is caller misuse.
    pub fn close(self: &Arc<Self>) -> Result<()> {
        let generation = {
            let mut state = self.state.lock();
            match state.status {
                TransactionStatus::Open | TransactionStatus::TerminationRequested => {
                    state.close();
                    state.generation
                }
                TransactionStatus::Closed => return Ok(()),
                TransactionStatus::NotStarted => {
                    return Err(KernelError::illegal_state(
                        "close on NOT_STARTED transaction",
                    ));
                }
            }
        };
        self.retire(generation);
        tracing::debug!(generation = generation.as_u64(), "transaction closed");
        Ok(())
    }

    /// Deregister the retired stamp and hand the object back to the pool
    ///
    /// Deregistration must come first: the instant the object enters the
    /// idle list it may be handed out again, and a stale registry entry must
    /// not be able to resolve to the new occupant.
    fn retire(self: &Arc<Self>, generation: Generation) {
        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(generation);
        }
        if let Some(pool) = self.pool.upgrade() {
            pool.release(Arc::clone(self));
        }
    }

    /// True while the current occupancy is live (open or marked)
    pub fn is_open(&self) -> bool {
        self.state.lock().status.is_open()
    }

    /// Stamp-checked liveness, used by handles
    pub(crate) fn is_open_for(&self, expected: Generation) -> bool {
        let state = self.state.lock();
        state.generation == expected && state.status.is_open()
    }

    /// Current lifecycle status
    pub fn status(&self) -> TransactionStatus {
        self.state.lock().status
    }

    /// Current generation stamp of this backing object
    pub fn generation(&self) -> Generation {
        self.state.lock().generation
    }

    /// Live termination reason of the current occupancy, if any
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.state.lock().termination_reason
    }

    /// Access mode of the current occupancy (meaningful while live)
    pub fn access_mode(&self) -> AccessMode {
        self.state.lock().access_mode
    }

    /// How the current occupancy was opened (meaningful while live)
    pub fn transaction_type(&self) -> TransactionType {
        self.state.lock().tx_type
    }

    /// Wall-clock start time of the current occupancy
    pub fn local_start_time(&self) -> DateTime<Utc> {
        self.state.lock().local_start_time
    }

    /// Last-committed marker pair captured when the current occupancy began
    pub fn start_snapshot(&self) -> CommitSnapshot {
        self.state.lock().snapshot
    }

    /// Mint a handle from the current live state
    ///
    /// Returns `None` when the transaction is not live — enumeration racing
    /// a close simply skips the entry. The handle copies the state fields
    /// and the stamp in one critical section.
    pub(crate) fn snapshot_handle(
        self: &Arc<Self>,
        registry: &Arc<TransactionRegistry>,
    ) -> Option<TransactionHandle> {
        let state = self.state.lock();
        if !state.status.is_open() {
            return None;
        }
        Some(TransactionHandle::new(
            state.generation,
            state.snapshot,
            state.local_start_time,
            state.access_mode,
            state.tx_type,
            state.termination_reason,
            Arc::clone(registry),
            Arc::downgrade(self),
        ))
    }
}

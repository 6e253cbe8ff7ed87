//! Lifecycle state record backing one logical transaction at a time
//!
//! `TransactionState` is owned by exactly one [`KernelTransaction`] and
//! mutated only under that transaction's lock. The generation stamp lives
//! inside the same record, so a reset and its new stamp are always observed
//! together or not at all.
//!
//! [`KernelTransaction`]: crate::KernelTransaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vertex_core::types::{
    AccessMode, CommitSnapshot, Generation, TerminationReason, TransactionType,
};

/// Lifecycle status of a transaction
///
/// State transitions:
/// ```text
/// NotStarted ──begin──> Open ──────────close──────────> Closed
///                         │                               ^
///                         └──mark──> TerminationRequested ┘
///
/// Closed ──(pool reuse: begin under a new generation)──> Open
/// ```
///
/// No transition skips `Closed` before reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Freshly allocated, never begun
    NotStarted,
    /// Live and doing work
    Open,
    /// Live, but asked to abort at its next safe point
    TerminationRequested,
    /// Finished; eligible for pool reuse
    Closed,
}

impl TransactionStatus {
    /// True while the transaction is live (open or marked for termination)
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Open | TransactionStatus::TerminationRequested
        )
    }

    /// True when a new `begin` is valid from this status
    pub fn can_begin(&self) -> bool {
        matches!(self, TransactionStatus::NotStarted | TransactionStatus::Closed)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::NotStarted => write!(f, "NOT_STARTED"),
            TransactionStatus::Open => write!(f, "OPEN"),
            TransactionStatus::TerminationRequested => write!(f, "TERMINATION_REQUESTED"),
            TransactionStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// The mutable lifecycle record of one pooled transaction object
///
/// Fields other than `status`, `termination_reason` and `generation` are
/// meaningful only while the status is open; they hold inert placeholder
/// values before the first `begin` and stale values after `close` until the
/// next reuse resets them.
#[derive(Debug)]
pub(crate) struct TransactionState {
    pub(crate) generation: Generation,
    pub(crate) status: TransactionStatus,
    pub(crate) termination_reason: Option<TerminationReason>,
    pub(crate) snapshot: CommitSnapshot,
    pub(crate) local_start_time: DateTime<Utc>,
    pub(crate) access_mode: AccessMode,
    pub(crate) tx_type: TransactionType,
}

impl TransactionState {
    /// Record for a freshly allocated, never-begun object
    pub(crate) fn unused() -> Self {
        Self {
            generation: Generation::new(0),
            status: TransactionStatus::NotStarted,
            termination_reason: None,
            snapshot: CommitSnapshot::genesis(),
            local_start_time: DateTime::<Utc>::UNIX_EPOCH,
            access_mode: AccessMode::Read,
            tx_type: TransactionType::Implicit,
        }
    }

    /// Reset the record for a new logical transaction under `generation`
    ///
    /// Clears any termination reason left by the previous occupant and stamps
    /// the start time. Must run in the same critical section that assigned
    /// the stamp.
    pub(crate) fn reset_for(
        &mut self,
        generation: Generation,
        access_mode: AccessMode,
        tx_type: TransactionType,
        snapshot: CommitSnapshot,
    ) {
        self.generation = generation;
        self.status = TransactionStatus::Open;
        self.termination_reason = None;
        self.snapshot = snapshot;
        self.local_start_time = Utc::now();
        self.access_mode = access_mode;
        self.tx_type = tx_type;
    }

    /// Request cooperative termination; first caller's reason is kept
    ///
    /// Returns `true` when the transaction is (now) marked, `false` when it
    /// is not live.
    pub(crate) fn request_termination(&mut self, reason: TerminationReason) -> bool {
        match self.status {
            TransactionStatus::Open => {
                self.status = TransactionStatus::TerminationRequested;
                self.termination_reason = Some(reason);
                true
            }
            // already marked: the first reason stands
            TransactionStatus::TerminationRequested => true,
            TransactionStatus::NotStarted | TransactionStatus::Closed => false,
        }
    }

    /// Transition to `Closed`
    ///
    /// The termination reason is left in place until the next reuse so a late
    /// live read still sees why the transaction ended.
    pub(crate) fn close(&mut self) {
        self.status = TransactionStatus::Closed;
    }
}

//! Collaborator traits at the kernel boundary
//!
//! The transaction core does not own the store or the commit pipeline; it
//! consumes them through [`CommitTracker`], which supplies the last-committed
//! marker pair used to stamp a transaction's read-visibility snapshot at
//! begin time.

use crate::types::CommitSnapshot;
use chrono::Utc;
use parking_lot::RwLock;

/// Source of last-committed transaction markers
///
/// Implemented by the store/commit layer. Queried once per `begin`; the
/// returned pair is copied into the new transaction's state and never
/// refreshed for that transaction.
pub trait CommitTracker: Send + Sync {
    /// The id and timestamp of the last transaction committed to the store
    fn last_committed(&self) -> CommitSnapshot;
}

/// In-memory commit tracker for embedded use
///
/// Holds the marker pair behind a read-write lock so the id and its timestamp
/// always advance together. The surrounding engine calls [`record_commit`]
/// after each durable commit.
///
/// [`record_commit`]: InMemoryCommitTracker::record_commit
#[derive(Debug)]
pub struct InMemoryCommitTracker {
    current: RwLock<CommitSnapshot>,
}

impl InMemoryCommitTracker {
    /// Create a tracker over an empty store
    pub fn new() -> Self {
        Self {
            current: RwLock::new(CommitSnapshot::genesis()),
        }
    }

    /// Create a tracker seeded with an already-recovered marker pair
    pub fn starting_from(snapshot: CommitSnapshot) -> Self {
        Self {
            current: RwLock::new(snapshot),
        }
    }

    /// Record a newly committed transaction id, stamped now
    pub fn record_commit(&self, tx_id: u64) {
        *self.current.write() = CommitSnapshot::new(tx_id, Utc::now());
    }
}

impl Default for InMemoryCommitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitTracker for InMemoryCommitTracker {
    fn last_committed(&self) -> CommitSnapshot {
        *self.current.read()
    }
}

//! Core types for the transaction kernel
//!
//! This module defines the fundamental types used throughout the system:
//! - [`Generation`]: Monotonic stamp distinguishing reuses of a pooled transaction object
//! - [`AccessMode`]: Capability set fixed for a transaction's lifetime
//! - [`TransactionType`]: How the transaction was opened (explicit vs. implicit)
//! - [`TerminationReason`]: Why a transaction was asked to terminate
//! - [`CommitSnapshot`]: Last-committed marker pair captured at transaction start

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation stamp for one occupancy of a pooled transaction object
///
/// Every time a backing object is reused for a new logical transaction it is
/// assigned a strictly greater stamp, so two logical transactions sharing the
/// same object never share a stamp and a stamp is never reissued. Handles
/// carry the stamp they were minted for; every live-state operation
/// re-validates it before touching the backing object.
///
/// # Examples
///
/// ```
/// use vertex_core::types::Generation;
///
/// let g1 = Generation::new(1);
/// let g2 = Generation::new(2);
/// assert!(g2 > g1);
/// assert_eq!(g1.as_u64(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Create a generation stamp from its raw value
    pub const fn new(raw: u64) -> Self {
        Generation(raw)
    }

    /// Get the raw stamp value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen_{}", self.0)
    }
}

/// How a transaction was opened
///
/// Explicit transactions are demarcated by the client; implicit transactions
/// wrap a single statement and are opened and closed by the kernel itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Client-demarcated transaction
    Explicit,
    /// Auto-commit transaction wrapping a single unit of work
    Implicit,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Explicit => write!(f, "explicit"),
            TransactionType::Implicit => write!(f, "implicit"),
        }
    }
}

/// Capability set granted to a transaction for its lifetime
///
/// The mode is fixed at begin time and never changes while the transaction is
/// live. Monitoring code reads it off the handle snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Read data only
    Read,
    /// Read and write data, no schema changes
    Write,
    /// Read and write data and schema
    Schema,
    /// Unrestricted access
    Full,
    /// Reduced read-only surface for sandboxed callers
    Restricted,
}

impl AccessMode {
    /// Whether this mode permits reading data
    pub fn allows_reads(&self) -> bool {
        // every mode can read; Restricted narrows what is visible, not whether
        true
    }

    /// Whether this mode permits writing data
    pub fn allows_writes(&self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::Schema | AccessMode::Full)
    }

    /// Whether this mode permits schema changes
    pub fn allows_schema_writes(&self) -> bool {
        matches!(self, AccessMode::Schema | AccessMode::Full)
    }

    /// Stable name for monitoring output
    pub fn name(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Schema => "schema",
            AccessMode::Full => "full",
            AccessMode::Restricted => "restricted",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Why a transaction was marked for termination
///
/// Recorded at most once per logical transaction (first writer wins) and
/// surfaced to the transaction's own thread at its next safe point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Explicitly killed by an administrator or client
    Terminated,
    /// Ran past its allotted time
    Timeout,
    /// Chosen as a deadlock victim
    Deadlock,
    /// Memory guard tripped
    OutOfMemory,
    /// Kernel is shutting down
    ShuttingDown,
}

impl TerminationReason {
    /// Canonical code for wire and log output
    ///
    /// These codes are stable and must not change.
    pub fn code(&self) -> &'static str {
        match self {
            TerminationReason::Terminated => "Terminated",
            TerminationReason::Timeout => "TransactionTimedOut",
            TerminationReason::Deadlock => "DeadlockDetected",
            TerminationReason::OutOfMemory => "OutOfMemory",
            TerminationReason::ShuttingDown => "DatabaseUnavailable",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Last-committed marker pair captured at transaction start
///
/// Defines the transaction's read-visibility snapshot: the id and commit
/// timestamp of the store's last committed transaction at the moment this
/// transaction began. Immutable once captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSnapshot {
    /// Id of the last transaction committed to the store
    pub last_committed_tx_id: u64,
    /// Commit timestamp paired with the id
    pub last_committed_tx_timestamp: DateTime<Utc>,
}

impl CommitSnapshot {
    /// Create a snapshot marker pair
    pub fn new(last_committed_tx_id: u64, last_committed_tx_timestamp: DateTime<Utc>) -> Self {
        Self {
            last_committed_tx_id,
            last_committed_tx_timestamp,
        }
    }

    /// Marker pair for an empty store (nothing committed yet)
    pub fn genesis() -> Self {
        Self::new(0, DateTime::<Utc>::UNIX_EPOCH)
    }
}

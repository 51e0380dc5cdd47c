//! Error types for store operations.

use anchorwatch_core::SettleError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Journal backend error.
    #[error("journal error: {0}")]
    Journal(#[from] anchorwatch_journal::JournalError),
    /// Record (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// An event with this id is already stored.
    #[error("event {0} already stored")]
    DuplicateEvent(Uuid),
    /// No event with this id is stored.
    #[error("unknown event {0}")]
    UnknownEvent(Uuid),
    /// Ledger state could not be settled.
    #[error("cannot settle event {id}: {source}")]
    Settle {
        /// Event id.
        id: Uuid,
        /// Cause.
        #[source]
        source: SettleError,
    },
    /// Persisted data violates a model invariant.
    #[error("corrupt store: {0}")]
    Corrupt(String),
    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

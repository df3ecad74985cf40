//! Trait definitions for external interactions
//!
//! These traits define the boundary between the provenance core and the
//! versioned ledger. Implementations live in provledger-store.

use crate::HistoryEntry;

/// A versioned key/value ledger
///
/// Every `put_state` and `delete_state` appends a version to the key's
/// history; the ledger assigns the transaction id and commit instant.
pub trait Ledger {
    /// Error type for ledger operations
    type Error;

    /// Cursor over the history of one key
    type History<'a>: HistoryCursor<Error = Self::Error>
    where
        Self: 'a;

    /// Current value of a key, `None` if never written or deleted
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Write a new version of a key
    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), Self::Error>;

    /// Record a delete version for a key
    fn delete_state(&mut self, key: &str) -> Result<(), Self::Error>;

    /// Open a cursor over every version of a key, oldest first
    fn history_for_key(&self, key: &str) -> Result<Self::History<'_>, Self::Error>;
}

/// A lazy, finite, one-shot sequence of [`HistoryEntry`] values
///
/// The cursor holds a ledger resource; callers must `close` it once they are
/// done. Wrap it in [`crate::ScopedHistory`] rather than closing by hand.
pub trait HistoryCursor {
    /// Error type for cursor operations
    type Error;

    /// Next entry, or `None` once exhausted
    fn next_entry(&mut self) -> Option<Result<HistoryEntry, Self::Error>>;

    /// Release the underlying resource
    fn close(&mut self) -> Result<(), Self::Error>;
}

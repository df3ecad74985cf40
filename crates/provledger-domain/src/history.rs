//! Ledger version history
//!
//! The ledger reports each prior version of a key as a [`HistoryEntry`]
//! through a one-shot [`HistoryCursor`]. [`ScopedHistory`] owns such a cursor
//! and guarantees it is closed exactly once, whichever way iteration ends.

use crate::traits::HistoryCursor;
use chrono::{DateTime, SecondsFormat};

/// Commit instant of a ledger version, as seconds and nanoseconds since the
/// Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerTimestamp {
    /// Whole seconds since the epoch
    pub seconds: i64,

    /// Nanosecond remainder, `0..1_000_000_000`
    pub nanos: i32,
}

impl LedgerTimestamp {
    /// Create a timestamp
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Render as RFC 3339 in UTC with nanosecond precision
    ///
    /// Returns `None` when the value is outside the representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use provledger_domain::LedgerTimestamp;
    ///
    /// let ts = LedgerTimestamp::new(1_541_852_155, 28_000_000);
    /// assert_eq!(ts.to_rfc3339().unwrap(), "2018-11-10T12:15:55.028000000Z");
    /// ```
    pub fn to_rfc3339(&self) -> Option<String> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
}

/// One prior version of a ledger key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Transaction that wrote this version
    pub tx_id: String,

    /// Stored bytes; `None` for a delete
    pub value: Option<Vec<u8>>,

    /// Commit instant
    pub timestamp: LedgerTimestamp,

    /// Whether this version deleted the key
    pub is_delete: bool,
}

/// Owning guard around a [`HistoryCursor`]
///
/// Iterating yields entries until the cursor is exhausted. The cursor is
/// closed by [`ScopedHistory::finish`] or, if that is never reached (early
/// return, `?`, unwind), by `Drop`. Never both.
pub struct ScopedHistory<C: HistoryCursor> {
    cursor: C,
    closed: bool,
}

impl<C: HistoryCursor> ScopedHistory<C> {
    /// Take ownership of an open cursor
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    /// Close the cursor and report the close result
    pub fn finish(mut self) -> Result<(), C::Error> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<C: HistoryCursor> Iterator for ScopedHistory<C> {
    type Item = Result<HistoryEntry, C::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.cursor.next_entry()
    }
}

impl<C: HistoryCursor> Drop for ScopedHistory<C> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            // Nothing to report to on this path
            let _ = self.cursor.close();
        }
    }
}

//! SQLite-backed ledger

use crate::{commit_stamp, StoreError};
use provledger_domain::traits::{HistoryCursor, Ledger};
use provledger_domain::{HistoryEntry, LedgerTimestamp};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Durable versioned ledger
///
/// Every write appends a row to `versions`; the newest row per key is the
/// current state.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// SqliteLedger.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) a ledger at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use provledger_store::SqliteLedger;
    ///
    /// let ledger = SqliteLedger::new("provledger.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let ledger = Self { conn };
        ledger.initialize_schema()?;
        Ok(ledger)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn append(&mut self, key: &str, value: Option<&[u8]>) -> Result<(), StoreError> {
        let (tx_id, timestamp) = commit_stamp();
        tracing::debug!(key, tx_id = %tx_id, is_delete = value.is_none(), "appending version");

        self.conn.execute(
            "INSERT INTO versions (key, tx_id, value, is_delete, ts_seconds, ts_nanos)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                key,
                &tx_id,
                value,
                value.is_none(),
                timestamp.seconds,
                timestamp.nanos,
            ],
        )?;
        Ok(())
    }
}

impl Ledger for SqliteLedger {
    type Error = StoreError;
    type History<'a> = SqliteHistory<'a>;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        let latest: Option<(Option<Vec<u8>>, bool)> = self
            .conn
            .query_row(
                "SELECT value, is_delete FROM versions WHERE key = ?1 ORDER BY seq DESC LIMIT 1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match latest {
            None | Some((_, true)) => Ok(None),
            Some((Some(value), false)) => Ok(Some(value)),
            Some((None, false)) => Err(StoreError::InvalidData(format!(
                "version of '{}' has no value and is not a delete",
                key
            ))),
        }
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        self.append(key, Some(value))
    }

    fn delete_state(&mut self, key: &str) -> Result<(), Self::Error> {
        self.append(key, None)
    }

    fn history_for_key(&self, key: &str) -> Result<Self::History<'_>, Self::Error> {
        // Versions committed after this point are not part of the cursor
        let upper: Option<i64> = self.conn.query_row(
            "SELECT MAX(seq) FROM versions WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;

        Ok(SqliteHistory {
            conn: &self.conn,
            key: key.to_string(),
            last_seq: 0,
            upper_seq: upper.unwrap_or(0),
            closed: false,
        })
    }
}

/// History cursor over a [`SqliteLedger`] key
///
/// Fetches one row per step, keyed on the last sequence number seen, so no
/// statement stays open between steps.
pub struct SqliteHistory<'a> {
    conn: &'a Connection,
    key: String,
    last_seq: i64,
    upper_seq: i64,
    closed: bool,
}

impl SqliteHistory<'_> {
    fn fetch_next(&self) -> Result<Option<(i64, HistoryEntry)>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT seq, tx_id, value, is_delete, ts_seconds, ts_nanos
                 FROM versions
                 WHERE key = ?1 AND seq > ?2 AND seq <= ?3
                 ORDER BY seq ASC LIMIT 1",
                params![&self.key, self.last_seq, self.upper_seq],
                |row| {
                    let seq: i64 = row.get(0)?;
                    let is_delete: bool = row.get(3)?;
                    let value: Option<Vec<u8>> = row.get(2)?;
                    Ok((
                        seq,
                        HistoryEntry {
                            tx_id: row.get(1)?,
                            value: if is_delete { None } else { value },
                            timestamp: LedgerTimestamp::new(row.get(4)?, row.get(5)?),
                            is_delete,
                        },
                    ))
                },
            )
            .optional()?;
        Ok(row)
    }
}

impl HistoryCursor for SqliteHistory<'_> {
    type Error = StoreError;

    fn next_entry(&mut self) -> Option<Result<HistoryEntry, Self::Error>> {
        if self.closed {
            return None;
        }
        match self.fetch_next() {
            Ok(Some((seq, entry))) => {
                self.last_seq = seq;
                Some(Ok(entry))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        tracing::debug!(key = %self.key, "closing history cursor");
        self.closed = true;
        Ok(())
    }
}

//! In-memory ledger

use crate::{commit_stamp, StoreError};
use provledger_domain::traits::{HistoryCursor, Ledger};
use provledger_domain::HistoryEntry;
use std::collections::HashMap;

/// Process-local versioned ledger
///
/// Versions are kept per key in commit order. Nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    versions: HashMap<String, Vec<HistoryEntry>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have ever been written
    pub fn key_count(&self) -> usize {
        self.versions.len()
    }

    /// Total number of versions across all keys
    pub fn version_count(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    fn append(&mut self, key: &str, value: Option<Vec<u8>>) {
        let (tx_id, timestamp) = commit_stamp();
        tracing::debug!(key, tx_id = %tx_id, is_delete = value.is_none(), "appending version");
        self.versions
            .entry(key.to_string())
            .or_default()
            .push(HistoryEntry {
                tx_id,
                is_delete: value.is_none(),
                value,
                timestamp,
            });
    }
}

impl Ledger for MemoryLedger {
    type Error = StoreError;
    type History<'a> = MemoryHistory<'a>;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self
            .versions
            .get(key)
            .and_then(|versions| versions.last())
            .and_then(|latest| latest.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        self.append(key, Some(value.to_vec()));
        Ok(())
    }

    fn delete_state(&mut self, key: &str) -> Result<(), Self::Error> {
        self.append(key, None);
        Ok(())
    }

    fn history_for_key(&self, key: &str) -> Result<Self::History<'_>, Self::Error> {
        let versions = self.versions.get(key).map(Vec::as_slice).unwrap_or(&[]);
        Ok(MemoryHistory {
            versions,
            position: 0,
            closed: false,
        })
    }
}

/// History cursor over a [`MemoryLedger`] key
#[derive(Debug)]
pub struct MemoryHistory<'a> {
    versions: &'a [HistoryEntry],
    position: usize,
    closed: bool,
}

impl HistoryCursor for MemoryHistory<'_> {
    type Error = StoreError;

    fn next_entry(&mut self) -> Option<Result<HistoryEntry, Self::Error>> {
        if self.closed {
            return None;
        }
        let entry = self.versions.get(self.position)?.clone();
        self.position += 1;
        Some(Ok(entry))
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.closed = true;
        Ok(())
    }
}

//! Provledger Storage Layer
//!
//! Implements the `Ledger` trait twice:
//!
//! - [`MemoryLedger`]: process-local, for tests and embedding
//! - [`SqliteLedger`]: durable, one append-only `versions` table
//!
//! Both assign a UUIDv7 transaction id and the wall-clock commit instant to
//! every version, and both report history oldest first.
//!
//! # Examples
//!
//! ```
//! use provledger_domain::traits::Ledger;
//! use provledger_store::MemoryLedger;
//!
//! let mut ledger = MemoryLedger::new();
//! ledger.put_state("H1", b"<prov:document/>").unwrap();
//! assert_eq!(ledger.get_state("H1").unwrap().unwrap(), b"<prov:document/>");
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::{MemoryHistory, MemoryLedger};
pub use sqlite::{SqliteHistory, SqliteLedger};

use chrono::Utc;
use provledger_domain::LedgerTimestamp;
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Transaction id and commit instant for a new version
pub(crate) fn commit_stamp() -> (String, LedgerTimestamp) {
    let now = Utc::now();
    let stamp = LedgerTimestamp::new(now.timestamp(), now.timestamp_subsec_nanos() as i32);
    (uuid::Uuid::now_v7().to_string(), stamp)
}

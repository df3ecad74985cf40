//! Provledger Contract
//!
//! Records and reconstructs W3C PROV provenance for documents and document
//! segments on top of a versioned ledger.
//!
//! The contract provides:
//! - Positional write request decoding ([`WriteRequest`])
//! - PROV-XML document encoding and decoding ([`document`])
//! - History aggregation for reads ([`aggregator`])
//! - `init` / `set` / `get` dispatch ([`ProvenanceContract`])
//!
//! # Examples
//!
//! ```
//! use provledger_contract::{ContractConfig, ProvenanceContract, Response};
//! use provledger_store::MemoryLedger;
//!
//! let mut contract = ProvenanceContract::new(MemoryLedger::new(), ContractConfig::default());
//!
//! let response = contract.invoke("get", &["unknown-hash"]);
//! assert_eq!(response, Response::Error("Hash not found: unknown-hash".to_string()));
//! ```

#![warn(missing_docs)]

pub mod aggregator;
mod config;
mod contract;
mod decoder;
pub mod document;
mod error;

pub use aggregator::{
    aggregate, Aggregated, CombinedEnvelope, HistoryRecord, HistorySection, NO_HISTORY_AVAILABLE,
};
pub use config::ContractConfig;
pub use contract::{
    ProvenanceContract, Response, ReturnedMessage, WriteOutcome, INITIALIZATION_DONE,
    PROCESSED_OK,
};
pub use decoder::{WriteRequest, REQUIRED_ARGS};
pub use error::{ContractError, DocumentError, HistoryUnavailable};

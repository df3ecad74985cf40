//! Provledger Domain Layer
//!
//! This crate contains the provenance model shared by every other layer: the
//! W3C PROV graph recorded for a document, the pure builder that produces it,
//! the history model returned by the ledger, and the trait interfaces the
//! ledger implementations satisfy.
//!
//! ## Key Concepts
//!
//! - **Agent / Location**: who performed an action and where
//! - **ProvenanceRecord**: fixed-shape graph of entities, one activity, one agent and relations
//! - **GenerationTime**: the validated `YYYY-MM-DDTHH:MM:SS.sssZ` instant of the activity
//! - **HistoryEntry**: one prior ledger version of a key
//! - **Ledger**: versioned key/value store contract (get, put, delete, history)
//!
//! ## Architecture
//!
//! - No I/O and no logging
//! - Graph construction is pure: identical inputs yield identical records
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod builder;
pub mod error;
pub mod history;
pub mod record;
pub mod timestamp;
pub mod traits;

// Re-exports for convenience
pub use agent::{Agent, Location};
pub use builder::{build_primary, build_segment};
pub use error::DomainError;
pub use history::{HistoryEntry, LedgerTimestamp, ScopedHistory};
pub use record::{Activity, Entity, ProvenanceRecord, Relation};
pub use timestamp::GenerationTime;

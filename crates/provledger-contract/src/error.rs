//! Contract error types

use provledger_domain::DomainError;
use std::fmt;
use thiserror::Error;

/// Errors that abort an invocation
///
/// Rendered to a single message string at the dispatch boundary.
#[derive(Error, Debug)]
pub enum ContractError {
    /// Invocation carried no arguments at all
    #[error("No arguments passed")]
    NoArguments,

    /// Write request is too short to carry every positional field
    #[error("Invalid number of parameters. Expected at least {expected}, received {received}")]
    Argument {
        /// Minimum argument count
        expected: usize,
        /// Arguments actually supplied
        received: usize,
    },

    /// Generation time does not match the fixed layout
    #[error("Timestamp format error: {0}")]
    TimestampFormat(#[from] DomainError),

    /// Read of a key the ledger has never seen (or that was deleted)
    #[error("Hash not found: {0}")]
    NotFound(String),

    /// Underlying ledger failure
    #[error("Store error: {0}")]
    Store(String),

    /// Document or payload encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Function name the dispatcher does not route
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl From<DocumentError> for ContractError {
    fn from(e: DocumentError) -> Self {
        ContractError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        ContractError::Serialization(e.to_string())
    }
}

/// Errors from writing or reading a PROV document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// XML writer failure
    #[error("Failed to write document: {0}")]
    Write(String),

    /// Input is not well-formed or not a PROV document
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// A required element is absent
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// The recorded generation time is invalid
    #[error("Invalid generation time: {0}")]
    Time(#[from] DomainError),
}

/// History lookup failed; the read continues without it
///
/// Never aborts an invocation. The aggregator logs it and folds it into the
/// result next to the degraded envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("History unavailable for '{key}': {reason}")]
pub struct HistoryUnavailable {
    /// Key whose history was requested
    pub key: String,
    /// Underlying failure
    pub reason: String,
}

impl HistoryUnavailable {
    /// Create from any displayable failure
    pub fn new(key: &str, reason: impl fmt::Display) -> Self {
        Self {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

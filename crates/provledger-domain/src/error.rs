//! Domain error types

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Generation time does not match `YYYY-MM-DDTHH:MM:SS.sssZ`
    #[error("Invalid timestamp '{value}': {reason}")]
    TimestampFormat {
        /// The rejected input
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

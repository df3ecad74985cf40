//! Error types for the CLI application.

use crate::config::ConfigError;
use provledger_contract::ContractError;
use provledger_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ledger could not be opened
    #[error("Ledger error: {0}")]
    Store(#[from] StoreError),

    /// The contract answered with an error message
    #[error("{0}")]
    Rejected(String),

    /// Payload could not be decoded
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

//! Invocation dispatch
//!
//! [`ProvenanceContract`] receives an operation name and a flat argument
//! list, routes to the write or read path, and answers with a success token,
//! a success payload, or one human readable failure message.

use crate::aggregator::{aggregate, Aggregated};
use crate::document::serialize;
use crate::{ContractConfig, ContractError, WriteRequest};
use provledger_domain::traits::Ledger;
use provledger_domain::{build_primary, build_segment};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, error, info};

/// Success token of `init`
pub const INITIALIZATION_DONE: &str = "INITIALIZATION_DONE";

/// Success token of `set`
pub const PROCESSED_OK: &str = "PROCESSED_OK";

/// Result of an invocation as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success token or payload
    Success(Vec<u8>),

    /// Failure message
    Error(String),
}

impl Response {
    /// Whether the invocation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// Payload of a successful invocation
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Success(payload) => Some(payload),
            Response::Error(_) => None,
        }
    }

    /// Message of a failed invocation
    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Error(message) => Some(message),
        }
    }
}

/// Body of a successful `get`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedMessage {
    /// Base64 envelope payload
    #[serde(rename = "Provenance")]
    pub provenance: String,
}

/// Keys written by one `set`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The content hash
    pub primary_key: String,

    /// One key per segment, in request order
    pub segment_keys: Vec<String>,
}

/// Provenance contract over a versioned ledger
pub struct ProvenanceContract<L> {
    ledger: L,
    config: ContractConfig,
}

impl<L> ProvenanceContract<L>
where
    L: Ledger,
    L::Error: Display,
{
    /// Create a contract over the given ledger
    pub fn new(ledger: L, config: ContractConfig) -> Self {
        Self { ledger, config }
    }

    /// Borrow the ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Instantiation hook; nothing needs initializing
    pub fn init(&self) -> Response {
        info!("provenance contract initialized");
        Response::Success(INITIALIZATION_DONE.as_bytes().to_vec())
    }

    /// Route one invocation
    ///
    /// `init` answers the instantiation token, `set` writes, `get` reads.
    /// Any other name is rejected unless
    /// `legacy_dispatch` is configured, in which case it reads.
    pub fn invoke<S: AsRef<str>>(&mut self, function: &str, args: &[S]) -> Response {
        info!(function, args = args.len(), "invocation");

        if function == "init" {
            return self.init();
        }

        let result = if args.is_empty() {
            Err(ContractError::NoArguments)
        } else {
            match function {
                "set" => self.set(args).map(|_| PROCESSED_OK.as_bytes().to_vec()),
                "get" => self.get(args),
                _ if self.config.legacy_dispatch => self.get(args),
                other => Err(ContractError::UnknownFunction(other.to_string())),
            }
        };

        match result {
            Ok(payload) => Response::Success(payload),
            Err(e) => {
                error!(function, error = %e, "invocation failed");
                Response::Error(e.to_string())
            }
        }
    }

    /// Decode a positional write request and store it
    pub fn set<S: AsRef<str>>(&mut self, args: &[S]) -> Result<WriteOutcome, ContractError> {
        let request = WriteRequest::decode(args)?;
        self.write(&request)
    }

    /// Store the provenance of a document and of each of its segments
    ///
    /// The primary document is validated and built before anything is
    /// written. Segments are written one by one afterwards; if one fails,
    /// the primary and earlier segments stay committed.
    pub fn write(&mut self, request: &WriteRequest) -> Result<WriteOutcome, ContractError> {
        let record = build_primary(
            &request.content_hash,
            &request.agent,
            &request.action,
            &request.date,
        )?;
        let document = serialize(&record)?;
        self.put(&request.content_hash, &document)?;

        let mut segment_keys = Vec::with_capacity(request.segment_hashes.len());
        for segment_hash in &request.segment_hashes {
            debug!(segment = %segment_hash, "building segment provenance");
            let segment = build_segment(
                segment_hash,
                &request.content_hash,
                &request.agent,
                &request.action,
                &request.date,
            )?;
            let document = serialize(&segment)?;
            self.put(segment_hash, &document)?;
            segment_keys.push(segment_hash.clone());
        }

        info!(
            key = %request.content_hash,
            segments = segment_keys.len(),
            "provenance stored"
        );
        Ok(WriteOutcome {
            primary_key: request.content_hash.clone(),
            segment_keys,
        })
    }

    /// Read path: `{"Provenance": <payload>}` for the key in `args[0]`
    pub fn get<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<u8>, ContractError> {
        let key = args.first().ok_or(ContractError::NoArguments)?;
        let payload = self.read(key.as_ref())?.into_payload()?;
        Ok(serde_json::to_vec(&ReturnedMessage {
            provenance: payload,
        })?)
    }

    /// Merge the current value of `key` with its history
    pub fn read(&self, key: &str) -> Result<Aggregated, ContractError> {
        aggregate(&self.ledger, key)
    }

    /// Append a delete version for `key`
    ///
    /// Later reads of the key fail with [`ContractError::NotFound`]; its
    /// history, including the delete, stays readable once it is rewritten.
    pub fn delete(&mut self, key: &str) -> Result<(), ContractError> {
        let current = self
            .ledger
            .get_state(key)
            .map_err(|e| ContractError::Store(format!("Failed to get document {}: {}", key, e)))?;
        if current.is_none() {
            return Err(ContractError::NotFound(key.to_string()));
        }

        self.ledger
            .delete_state(key)
            .map_err(|e| ContractError::Store(format!("Failed to delete asset {}: {}", key, e)))?;
        info!(key, "provenance deleted");
        Ok(())
    }

    fn put(&mut self, key: &str, document: &str) -> Result<(), ContractError> {
        debug!(key, bytes = document.len(), "writing provenance document");
        self.ledger
            .put_state(key, document.as_bytes())
            .map_err(|e| ContractError::Store(format!("Failed to set asset {}: {}", key, e)))
    }
}

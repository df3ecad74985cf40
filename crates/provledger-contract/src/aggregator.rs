//! History aggregation for the read path
//!
//! [`aggregate`] merges the current value of a key with every prior ledger
//! version into a [`CombinedEnvelope`]. A missing key or a failing `get`
//! aborts the read. A failing history lookup does not: the envelope carries
//! the `NO_HISTORY_AVAILABLE` sentinel instead and the failure is returned
//! alongside it in [`Aggregated::degraded`].

use crate::{ContractError, HistoryUnavailable};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use provledger_domain::traits::Ledger;
use provledger_domain::{HistoryEntry, ScopedHistory};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Sentinel written in place of the history array when it cannot be read
pub const NO_HISTORY_AVAILABLE: &str = "NO_HISTORY_AVAILABLE";

/// One rendered ledger version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryRecord {
    /// Transaction that wrote the version
    pub tx_id: String,

    /// Base64 of the stored bytes; the text `"null"` for a delete
    #[serde(with = "value_text")]
    pub value: Option<String>,

    /// Commit instant, RFC 3339 UTC with nanoseconds
    pub timestamp: String,

    /// Whether the version deleted the key, as `"true"` / `"false"`
    #[serde(with = "bool_text")]
    pub is_delete: bool,
}

impl HistoryRecord {
    /// Render a ledger entry, `None` if its timestamp is out of range
    pub fn from_entry(entry: &HistoryEntry) -> Option<Self> {
        let value = match (&entry.value, entry.is_delete) {
            (_, true) | (None, _) => None,
            (Some(bytes), false) => Some(STANDARD.encode(bytes)),
        };

        Some(Self {
            tx_id: entry.tx_id.clone(),
            value,
            timestamp: entry.timestamp.to_rfc3339()?,
            is_delete: entry.is_delete,
        })
    }
}

/// The `History` field: either every version or the sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "HistoryWire", try_from = "HistoryWire")]
pub enum HistorySection {
    /// Versions, oldest first
    Entries(Vec<HistoryRecord>),

    /// History lookup failed
    Unavailable,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HistoryWire {
    Entries(Vec<HistoryRecord>),
    Sentinel(String),
}

impl From<HistorySection> for HistoryWire {
    fn from(section: HistorySection) -> Self {
        match section {
            HistorySection::Entries(entries) => HistoryWire::Entries(entries),
            HistorySection::Unavailable => {
                HistoryWire::Sentinel(NO_HISTORY_AVAILABLE.to_string())
            }
        }
    }
}

impl TryFrom<HistoryWire> for HistorySection {
    type Error = String;

    fn try_from(wire: HistoryWire) -> Result<Self, Self::Error> {
        match wire {
            HistoryWire::Entries(entries) => Ok(HistorySection::Entries(entries)),
            HistoryWire::Sentinel(s) if s == NO_HISTORY_AVAILABLE => {
                Ok(HistorySection::Unavailable)
            }
            HistoryWire::Sentinel(s) => Err(format!("unexpected history value '{}'", s)),
        }
    }
}

/// The unit returned to a read caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CombinedEnvelope {
    /// Base64 of the current stored value
    pub original: String,

    /// Prior versions or the sentinel
    pub history: HistorySection,
}

impl CombinedEnvelope {
    /// JSON-encode and base64 the envelope for transport
    pub fn to_payload(&self) -> Result<String, ContractError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Reverse [`CombinedEnvelope::to_payload`]
    pub fn decode_payload(payload: &str) -> Result<Self, ContractError> {
        let json = STANDARD
            .decode(payload.trim())
            .map_err(|e| ContractError::Serialization(format!("payload is not base64: {}", e)))?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Decoded bytes of the current value
    pub fn original_bytes(&self) -> Result<Vec<u8>, ContractError> {
        STANDARD
            .decode(&self.original)
            .map_err(|e| ContractError::Serialization(format!("original is not base64: {}", e)))
    }
}

/// Outcome of a read that reached the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    /// The envelope to return
    pub envelope: CombinedEnvelope,

    /// Set when the history section is the sentinel
    pub degraded: Option<HistoryUnavailable>,
}

impl Aggregated {
    /// Transport encoding of the envelope
    pub fn into_payload(self) -> Result<String, ContractError> {
        self.envelope.to_payload()
    }
}

/// Read the current value of `key` and merge it with the key's history
///
/// # Errors
/// [`ContractError::NotFound`] if the key has no current value,
/// [`ContractError::Store`] if the `get` fails. History failures never
/// surface here.
pub fn aggregate<L>(ledger: &L, key: &str) -> Result<Aggregated, ContractError>
where
    L: Ledger,
    L::Error: Display,
{
    let current = ledger
        .get_state(key)
        .map_err(|e| ContractError::Store(format!("Failed to get document {}: {}", key, e)))?
        .ok_or_else(|| ContractError::NotFound(key.to_string()))?;

    let (history, degraded) = match collect_history(ledger, key) {
        Ok(records) => {
            tracing::debug!(key, versions = records.len(), "history collected");
            (HistorySection::Entries(records), None)
        }
        Err(unavailable) => {
            tracing::warn!(key, error = %unavailable, "returning current value without history");
            (HistorySection::Unavailable, Some(unavailable))
        }
    };

    Ok(Aggregated {
        envelope: CombinedEnvelope {
            original: STANDARD.encode(current),
            history,
        },
        degraded,
    })
}

fn collect_history<L>(ledger: &L, key: &str) -> Result<Vec<HistoryRecord>, HistoryUnavailable>
where
    L: Ledger,
    L::Error: Display,
{
    let cursor = ledger
        .history_for_key(key)
        .map_err(|e| HistoryUnavailable::new(key, e))?;
    let mut scoped = ScopedHistory::new(cursor);

    let mut records = Vec::new();
    for entry in scoped.by_ref() {
        let entry = entry.map_err(|e| HistoryUnavailable::new(key, e))?;
        let record = HistoryRecord::from_entry(&entry).ok_or_else(|| {
            HistoryUnavailable::new(
                key,
                format!("transaction {} has an out of range timestamp", entry.tx_id),
            )
        })?;
        records.push(record);
    }

    // Every version was read; a failed release does not invalidate them
    if let Err(e) = scoped.finish() {
        tracing::warn!(key, error = %e, "failed to close history cursor");
    }
    Ok(records)
}

mod value_text {
    use serde::{Deserialize, Deserializer, Serializer};

    const NULL: &str = "null";

    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(NULL))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.filter(|t| t != NULL))
    }
}

mod bool_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

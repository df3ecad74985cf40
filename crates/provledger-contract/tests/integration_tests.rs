//! Integration tests for provledger-contract
//!
//! These tests drive the contract end to end over real ledgers, plus a
//! fault-injecting wrapper for the history degrade path.

use provledger_contract::document::{parse_document, serialize};
use provledger_contract::{
    CombinedEnvelope, ContractConfig, ContractError, HistorySection, ProvenanceContract,
    ReturnedMessage, WriteRequest, NO_HISTORY_AVAILABLE,
};
use provledger_domain::traits::{HistoryCursor, Ledger};
use provledger_domain::{build_primary, Agent, HistoryEntry, Relation};
use provledger_store::{MemoryHistory, MemoryLedger, SqliteLedger, StoreError};
use std::cell::Cell;
use std::rc::Rc;
use tempfile::TempDir;

const DATE: &str = "2018-11-10T12:15:55.028Z";

fn write_args(hash: &str, action: &str, date: &str) -> Vec<String> {
    let mut args = vec![hash.to_string()];
    for (name, value) in [
        ("agentInfo.atype", "1.2.3.4"),
        ("agentInfo.id", "agentidentifier"),
        ("agentInfo.name", "7.8.9"),
        ("agentInfo.idp", "urn:tiani-spirit:sts"),
        ("location.id", "2.3.4.5"),
        ("location.name", "Radiology"),
        ("location.locality", "Vienna"),
        ("location.docid", "doc-1"),
        ("action", action),
        ("date", date),
    ] {
        args.push(name.to_string());
        args.push(value.to_string());
    }
    args
}

fn memory_contract() -> ProvenanceContract<MemoryLedger> {
    ProvenanceContract::new(MemoryLedger::new(), ContractConfig::default())
}

fn read_envelope<L>(contract: &ProvenanceContract<L>, key: &str) -> CombinedEnvelope
where
    L: Ledger,
    L::Error: std::fmt::Display,
{
    let body = contract.get(&[key]).unwrap();
    let message: ReturnedMessage = serde_json::from_slice(&body).unwrap();
    CombinedEnvelope::decode_payload(&message.provenance).unwrap()
}

#[test]
fn test_write_args_shape() {
    let args = write_args("H1", "ex:CREATE", DATE);
    assert_eq!(args.len(), 21);
    assert_eq!(args[18], "ex:CREATE");
    assert_eq!(args[20], DATE);
}

#[test]
fn test_write_then_read_returns_serialized_document() {
    let mut contract = memory_contract();
    let args = write_args("H1", "ex:CREATE", DATE);
    contract.set(&args).unwrap();

    let request = WriteRequest::decode(&args).unwrap();
    let record = build_primary("H1", &request.agent, "ex:CREATE", DATE).unwrap();
    let expected = serialize(&record).unwrap();

    let envelope = read_envelope(&contract, "H1");
    assert_eq!(envelope.original_bytes().unwrap(), expected.as_bytes());

    match envelope.history {
        HistorySection::Entries(entries) => {
            assert_eq!(entries.len(), 1);
            assert!(!entries[0].is_delete);
        }
        HistorySection::Unavailable => panic!("history should be available"),
    }
}

#[test]
fn test_create_example_graph() {
    let mut contract = memory_contract();
    contract.set(&write_args("H1", "ex:CREATE", DATE)).unwrap();

    let envelope = read_envelope(&contract, "H1");
    let xml = String::from_utf8(envelope.original_bytes().unwrap()).unwrap();
    let record = parse_document(&xml).unwrap();

    assert_eq!(record.entities.len(), 1);
    assert_eq!(record.entities[0].value, "H1");
    assert_eq!(record.activity.activity_type, "ex:CREATE");
    assert_eq!(
        record.agent,
        Agent::new("1.2.3.4", "agentidentifier", "7.8.9", "urn:tiani-spirit:sts")
    );
    let names: Vec<_> = record.relations.iter().map(Relation::name).collect();
    assert_eq!(names, vec!["wasGeneratedBy", "wasAssociatedWith", "wasAttributedTo"]);
}

#[test]
fn test_short_request_mutates_nothing() {
    let mut contract = memory_contract();
    let mut args = write_args("H1", "ex:CREATE", DATE);
    args.truncate(19);

    let response = contract.invoke("set", &args);
    assert_eq!(
        response.message(),
        Some("Invalid number of parameters. Expected at least 21, received 19")
    );
    assert_eq!(contract.ledger().version_count(), 0);
}

#[test]
fn test_request_missing_only_date_fails() {
    let mut contract = memory_contract();
    let mut args = write_args("H1", "ex:CREATE", DATE);
    args.truncate(20);

    assert!(matches!(
        contract.set(&args),
        Err(ContractError::Argument { received: 20, .. })
    ));
    assert_eq!(contract.ledger().version_count(), 0);
}

#[test]
fn test_bad_date_fails_before_any_write() {
    let mut contract = memory_contract();
    let mut args = write_args("H1", "ex:CREATE", "2018-11-10T12:15:55Z");
    args.extend(["digest1".to_string(), "S1".to_string()]);

    assert!(matches!(
        contract.set(&args),
        Err(ContractError::TimestampFormat(_))
    ));
    assert_eq!(contract.ledger().version_count(), 0);
}

#[test]
fn test_segments_get_own_documents() {
    let mut contract = memory_contract();
    let mut args = write_args("H1", "ex:CREATE", DATE);
    for (i, hash) in ["S1", "S2", "S3"].iter().enumerate() {
        args.push(format!("digest{}", i + 1));
        args.push(hash.to_string());
    }

    let outcome = contract.set(&args).unwrap();
    assert_eq!(outcome.segment_keys, vec!["S1", "S2", "S3"]);

    for hash in ["S1", "S2", "S3"] {
        let envelope = read_envelope(&contract, hash);
        let xml = String::from_utf8(envelope.original_bytes().unwrap()).unwrap();
        let record = parse_document(&xml).unwrap();
        assert!(record.is_segmented());
        assert_eq!(record.segment_entity().unwrap().value, hash);
        assert_eq!(record.primary_entity().unwrap().value, "H1");
    }
}

#[test]
fn test_trailing_unpaired_argument_ignored() {
    let mut contract = memory_contract();
    let mut args = write_args("H1", "ex:CREATE", DATE);
    args.extend(["digest1", "S1", "digest2"].iter().map(|s| s.to_string()));

    let outcome = contract.set(&args).unwrap();
    assert_eq!(outcome.segment_keys, vec!["S1"]);
    assert_eq!(contract.ledger().key_count(), 2);
}

#[test]
fn test_rewrite_history_ordered() {
    let mut contract = memory_contract();
    contract.set(&write_args("H1", "ex:CREATE", DATE)).unwrap();
    contract
        .set(&write_args("H1", "ex:UPDATE", "2018-11-11T08:00:00.000Z"))
        .unwrap();

    let envelope = read_envelope(&contract, "H1");
    let HistorySection::Entries(ref entries) = envelope.history else {
        panic!("history should be available");
    };
    assert_eq!(entries.len(), 2);

    let latest = entries.last().and_then(|e| e.value.clone()).unwrap();
    assert_eq!(latest, envelope.original);

    let current = String::from_utf8(envelope.original_bytes().unwrap()).unwrap();
    assert!(current.contains("ex:UPDATE"));
    assert!(entries[0].timestamp <= entries[1].timestamp);
}

#[test]
fn test_unknown_key_not_found() {
    let contract = memory_contract();
    let err = contract.get(&["missing"]).unwrap_err();
    assert!(matches!(err, ContractError::NotFound(ref key) if key == "missing"));
    assert_eq!(err.to_string(), "Hash not found: missing");
}

#[test]
fn test_deleted_key_not_found() {
    let mut ledger = MemoryLedger::new();
    ledger.put_state("H1", b"<x/>").unwrap();
    ledger.delete_state("H1").unwrap();

    let contract = ProvenanceContract::new(ledger, ContractConfig::default());
    assert!(matches!(
        contract.read("H1"),
        Err(ContractError::NotFound(_))
    ));
}

#[test]
fn test_history_includes_delete_version() {
    let mut contract = memory_contract();
    contract.set(&write_args("H1", "ex:CREATE", DATE)).unwrap();
    contract.delete("H1").unwrap();
    contract
        .set(&write_args("H1", "ex:UPDATE", "2018-11-11T08:00:00.000Z"))
        .unwrap();

    let envelope = contract.read("H1").unwrap().envelope;
    let json = serde_json::to_value(&envelope).unwrap();
    let history = json["History"].as_array().unwrap();
    let deletes: Vec<_> = history.iter().map(|v| v["IsDelete"].clone()).collect();
    assert_eq!(deletes, vec!["false", "true", "false"]);
    assert_eq!(history[1]["Value"], "null");

    let HistorySection::Entries(entries) = envelope.history else {
        panic!("history should be available");
    };
    assert!(entries[1].value.is_none());
    assert!(entries[2].value.is_some());
}

#[test]
fn test_sqlite_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let ledger = SqliteLedger::new(&path).unwrap();
        let mut contract = ProvenanceContract::new(ledger, ContractConfig::default());
        contract.set(&write_args("H1", "ex:CREATE", DATE)).unwrap();
    }

    let ledger = SqliteLedger::new(&path).unwrap();
    let contract = ProvenanceContract::new(ledger, ContractConfig::default());
    let envelope = read_envelope(&contract, "H1");
    let xml = String::from_utf8(envelope.original_bytes().unwrap()).unwrap();
    assert_eq!(parse_document(&xml).unwrap().entities[0].value, "H1");
}

/// How the wrapped ledger misbehaves
#[derive(Clone, Copy)]
enum Fault {
    None,
    OpenFails,
    FailAfter(usize),
    CloseFails,
}

/// Ledger that injects history faults and counts cursor closes
struct FaultyLedger {
    inner: MemoryLedger,
    fault: Fault,
    closes: Rc<Cell<usize>>,
}

impl FaultyLedger {
    fn new(fault: Fault) -> Self {
        let mut inner = MemoryLedger::new();
        inner.put_state("H1", b"first").unwrap();
        inner.put_state("H1", b"second").unwrap();
        Self {
            inner,
            fault,
            closes: Rc::new(Cell::new(0)),
        }
    }
}

struct FaultyHistory<'a> {
    inner: MemoryHistory<'a>,
    fault: Fault,
    yielded: usize,
    closes: Rc<Cell<usize>>,
}

impl Ledger for FaultyLedger {
    type Error = StoreError;
    type History<'a> = FaultyHistory<'a>;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_state(key)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.inner.put_state(key, value)
    }

    fn delete_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.delete_state(key)
    }

    fn history_for_key(&self, key: &str) -> Result<FaultyHistory<'_>, StoreError> {
        if let Fault::OpenFails = self.fault {
            return Err(StoreError::InvalidData("history unavailable".to_string()));
        }
        Ok(FaultyHistory {
            inner: self.inner.history_for_key(key)?,
            fault: self.fault,
            yielded: 0,
            closes: Rc::clone(&self.closes),
        })
    }
}

impl HistoryCursor for FaultyHistory<'_> {
    type Error = StoreError;

    fn next_entry(&mut self) -> Option<Result<HistoryEntry, StoreError>> {
        if let Fault::FailAfter(n) = self.fault {
            if self.yielded == n {
                return Some(Err(StoreError::InvalidData("cursor broke".to_string())));
            }
        }
        self.yielded += 1;
        self.inner.next_entry()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closes.set(self.closes.get() + 1);
        if let Fault::CloseFails = self.fault {
            return Err(StoreError::InvalidData("close failed".to_string()));
        }
        self.inner.close()
    }
}

#[test]
fn test_history_closed_once_on_success() {
    let ledger = FaultyLedger::new(Fault::None);
    let closes = Rc::clone(&ledger.closes);
    let contract = ProvenanceContract::new(ledger, ContractConfig::default());

    let aggregated = contract.read("H1").unwrap();
    assert!(aggregated.degraded.is_none());
    assert_eq!(closes.get(), 1);
}

#[test]
fn test_history_open_failure_degrades() {
    let contract =
        ProvenanceContract::new(FaultyLedger::new(Fault::OpenFails), ContractConfig::default());

    let aggregated = contract.read("H1").unwrap();
    assert_eq!(aggregated.envelope.history, HistorySection::Unavailable);
    assert_eq!(aggregated.envelope.original_bytes().unwrap(), b"second");

    let degraded = aggregated.degraded.unwrap();
    assert_eq!(degraded.key, "H1");
    assert!(degraded.reason.contains("history unavailable"));
}

#[test]
fn test_history_iteration_failure_degrades_and_closes_once() {
    let ledger = FaultyLedger::new(Fault::FailAfter(1));
    let closes = Rc::clone(&ledger.closes);
    let contract = ProvenanceContract::new(ledger, ContractConfig::default());

    let body = contract.get(&["H1"]).unwrap();
    let message: ReturnedMessage = serde_json::from_slice(&body).unwrap();
    let envelope = CombinedEnvelope::decode_payload(&message.provenance).unwrap();
    assert_eq!(envelope.history, HistorySection::Unavailable);
    assert_eq!(closes.get(), 1);

    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["History"], NO_HISTORY_AVAILABLE);
}

#[test]
fn test_close_failure_keeps_history() {
    let ledger = FaultyLedger::new(Fault::CloseFails);
    let closes = Rc::clone(&ledger.closes);
    let contract = ProvenanceContract::new(ledger, ContractConfig::default());

    let aggregated = contract.read("H1").unwrap();
    assert!(aggregated.degraded.is_none());
    assert!(matches!(
        aggregated.envelope.history,
        HistorySection::Entries(ref entries) if entries.len() == 2
    ));
    assert_eq!(closes.get(), 1);
}

//! Write request decoding
//!
//! A write arrives as a flat list of strings alternating field names and
//! values after the content hash:
//!
//! | Position | Field |
//! |----------|-------|
//! | 0 | content hash (ledger key) |
//! | 2, 4, 6, 8 | agent type, id, name, identity provider |
//! | 10, 12, 14, 16 | location id, name, locality, document id |
//! | 18 | action |
//! | 20 | date |
//! | 21.. | `(label, segment hash)` pairs |
//!
//! Odd positions before 21 are field names and are not checked. This module
//! is the only place that knows these positions.

use crate::ContractError;
use provledger_domain::{Agent, Location};

/// Position of the date, the last mandatory field
const DATE_POS: usize = 20;

/// Position where the optional segment pairs begin
const FIRST_SEGMENT_POS: usize = DATE_POS + 1;

/// Smallest well-formed write request
pub const REQUIRED_ARGS: usize = DATE_POS + 1;

/// Wire names emitted by [`WriteRequest::to_args`] for positions 1..=19
const FIELD_NAMES: [&str; 10] = [
    "agentInfo.atype",
    "agentInfo.id",
    "agentInfo.name",
    "agentInfo.idp",
    "location.id",
    "location.name",
    "location.locality",
    "location.docid",
    "action",
    "date",
];

/// A decoded write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Hash of the whole document; the primary ledger key
    pub content_hash: String,

    /// Who performed the action
    pub agent: Agent,

    /// Where it happened (not recorded in the graph)
    pub location: Location,

    /// Action performed (e.g., "ex:CREATE")
    pub action: String,

    /// Generation time, still unvalidated text
    pub date: String,

    /// Hashes of document segments, each written under its own key
    pub segment_hashes: Vec<String>,
}

impl WriteRequest {
    /// Decode the positional argument list
    ///
    /// Only complete `(label, hash)` pairs after the date are used; a final
    /// unpaired argument is ignored and labels are discarded.
    ///
    /// # Errors
    /// Returns [`ContractError::Argument`] if the list is too short to reach
    /// the date field.
    ///
    /// # Examples
    ///
    /// ```
    /// use provledger_contract::WriteRequest;
    ///
    /// let mut args = vec!["H1".to_string()];
    /// for i in 1..=20 {
    ///     args.push(format!("v{}", i));
    /// }
    /// let request = WriteRequest::decode(&args).unwrap();
    /// assert_eq!(request.agent.agent_type, "v2");
    /// assert_eq!(request.date, "v20");
    /// assert!(request.segment_hashes.is_empty());
    /// ```
    pub fn decode<S: AsRef<str>>(args: &[S]) -> Result<Self, ContractError> {
        if args.len() < REQUIRED_ARGS {
            return Err(ContractError::Argument {
                expected: REQUIRED_ARGS,
                received: args.len(),
            });
        }

        let at = |i: usize| args[i].as_ref().to_string();

        let segment_hashes = args[FIRST_SEGMENT_POS..]
            .chunks_exact(2)
            .map(|pair| pair[1].as_ref().to_string())
            .collect();

        Ok(Self {
            content_hash: at(0),
            agent: Agent::new(at(2), at(4), at(6), at(8)),
            location: Location::new(at(10), at(12), at(14), at(16)),
            action: at(18),
            date: at(DATE_POS),
            segment_hashes,
        })
    }

    /// Encode back into the positional wire shape
    ///
    /// Field names are the canonical ones; segment labels are `digest1`,
    /// `digest2`, ...
    pub fn to_args(&self) -> Vec<String> {
        let values = [
            &self.agent.agent_type,
            &self.agent.id,
            &self.agent.name,
            &self.agent.identity_provider,
            &self.location.id,
            &self.location.name,
            &self.location.locality,
            &self.location.doc_id,
            &self.action,
            &self.date,
        ];

        let mut args = Vec::with_capacity(REQUIRED_ARGS + 2 * self.segment_hashes.len());
        args.push(self.content_hash.clone());
        for (name, value) in FIELD_NAMES.iter().zip(values) {
            args.push((*name).to_string());
            args.push(value.clone());
        }
        for (i, hash) in self.segment_hashes.iter().enumerate() {
            args.push(format!("digest{}", i + 1));
            args.push(hash.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn base_args() -> Vec<&'static str> {
        vec![
            "S52fkpF2rCEArSuwqyDA9tVjawUdrkGzbNQLaa7xJfA=",
            "agentInfo.atype", "1.2.3.4",
            "agentInfo.id", "agentidentifier",
            "agentinfo.name", "7.8.9",
            "agentinfo.idp", "urn:tiani-spirit:sts",
            "locationInfo.id", "urn:oid:1.2.3",
            "locationInfo.name", "General Hospital",
            "locationInfo.locality", "Nashville, TN",
            "locationInfo.docid", "1.2.3",
            "action", "ex:CREATE",
            "date", "2018-11-10T12:15:55.028Z",
        ]
    }

    #[test]
    fn test_decode_minimal_request() {
        let request = WriteRequest::decode(&base_args()).unwrap();

        assert_eq!(request.content_hash, "S52fkpF2rCEArSuwqyDA9tVjawUdrkGzbNQLaa7xJfA=");
        assert_eq!(
            request.agent,
            Agent::new("1.2.3.4", "agentidentifier", "7.8.9", "urn:tiani-spirit:sts")
        );
        assert_eq!(
            request.location,
            Location::new("urn:oid:1.2.3", "General Hospital", "Nashville, TN", "1.2.3")
        );
        assert_eq!(request.action, "ex:CREATE");
        assert_eq!(request.date, "2018-11-10T12:15:55.028Z");
        assert!(request.segment_hashes.is_empty());
    }

    #[test]
    fn test_decode_segment_pairs() {
        let mut args = base_args();
        args.extend(["digest1", "E0nioxbCYD5AlzGWXDDDl0Gt5AAKv3ppKt4XMhE1rfo"]);
        args.extend(["digest3", "xLrbWN5QJBJUAsdevfrxGlN3o0p8VZMnFFnV9iMll5o"]);

        let request = WriteRequest::decode(&args).unwrap();
        assert_eq!(
            request.segment_hashes,
            vec![
                "E0nioxbCYD5AlzGWXDDDl0Gt5AAKv3ppKt4XMhE1rfo",
                "xLrbWN5QJBJUAsdevfrxGlN3o0p8VZMnFFnV9iMll5o",
            ]
        );
    }

    #[test]
    fn test_dangling_argument_is_ignored() {
        let mut args = base_args();
        args.extend(["digest1", "HASH1", "digest2"]);

        let request = WriteRequest::decode(&args).unwrap();
        assert_eq!(request.segment_hashes, vec!["HASH1"]);

        let mut lone = base_args();
        lone.push("digest1");
        assert!(WriteRequest::decode(&lone).unwrap().segment_hashes.is_empty());
    }

    #[test]
    fn test_too_few_arguments() {
        let args = vec!["S52fkpF2rCEArSuwqyDA9tVjawUdrkGzbNQLaa7xJfA="];
        match WriteRequest::decode(&args) {
            Err(ContractError::Argument { expected, received }) => {
                assert_eq!(expected, 21);
                assert_eq!(received, 1);
            }
            other => panic!("expected argument error, got {:?}", other),
        }
    }

    #[test]
    fn test_date_position_must_exist() {
        let mut args = base_args();
        args.pop();
        assert_eq!(args.len(), 20);
        assert!(matches!(
            WriteRequest::decode(&args),
            Err(ContractError::Argument { .. })
        ));
    }

    #[test]
    fn test_to_args_round_trip() {
        let mut args = base_args();
        args.extend(["digest1", "HASH1", "digest2", "HASH2"]);
        let request = WriteRequest::decode(&args).unwrap();

        let encoded = request.to_args();
        assert_eq!(encoded.len(), 25);
        assert_eq!(encoded[1], "agentInfo.atype");
        assert_eq!(encoded[23], "digest2");
        assert_eq!(WriteRequest::decode(&encoded).unwrap(), request);
    }
}

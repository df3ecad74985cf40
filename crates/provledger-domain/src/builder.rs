//! Pure provenance graph builder
//!
//! Each constructor returns an immutable piece of the graph; the two entry
//! points compose them. The timestamp is parsed before any node exists, so a
//! bad date never yields a partial record.

use crate::record::{
    ACTIVITY_ID, ENTITY_TYPE, PRIMARY_ENTITY_ID, PRIMARY_ENTITY_LABEL, SEGMENT_ENTITY_ID,
    SEGMENT_ENTITY_LABEL,
};
use crate::{Activity, Agent, DomainError, Entity, GenerationTime, ProvenanceRecord, Relation};

/// Build the record of a whole document
///
/// Produces the primary entity, the creation activity, the agent, and the
/// `wasGeneratedBy`, `wasAssociatedWith` and `wasAttributedTo` relations.
///
/// # Errors
/// Returns [`DomainError::TimestampFormat`] if `timestamp` is malformed.
///
/// # Examples
///
/// ```
/// use provledger_domain::{build_primary, Agent};
///
/// let agent = Agent::new("1.2.3.4", "A1", "Dr X", "urn:idp");
/// let record = build_primary("H1", &agent, "ex:CREATE", "2018-11-10T12:15:55.028Z").unwrap();
/// assert_eq!(record.entities.len(), 1);
/// assert_eq!(record.relations.len(), 3);
/// ```
pub fn build_primary(
    content_hash: &str,
    agent: &Agent,
    action: &str,
    timestamp: &str,
) -> Result<ProvenanceRecord, DomainError> {
    let time = GenerationTime::parse(timestamp)?;

    Ok(ProvenanceRecord {
        entities: vec![primary_entity(content_hash)],
        activity: creation_activity(action),
        agent: agent.clone(),
        relations: vec![
            generated_by(time),
            associated_with(agent),
            Relation::WasAttributedTo {
                entity: PRIMARY_ENTITY_ID.to_string(),
                agent: agent.id.clone(),
            },
        ],
    })
}

/// Build the record of a document segment
///
/// The primary entity (valued with `content_hash`) is joined by a segment
/// entity (valued with `segment_hash`); `used` and `wasDerivedFrom` replace
/// `wasAttributedTo`.
///
/// # Errors
/// Returns [`DomainError::TimestampFormat`] if `timestamp` is malformed.
pub fn build_segment(
    segment_hash: &str,
    content_hash: &str,
    agent: &Agent,
    action: &str,
    timestamp: &str,
) -> Result<ProvenanceRecord, DomainError> {
    let time = GenerationTime::parse(timestamp)?;

    Ok(ProvenanceRecord {
        entities: vec![primary_entity(content_hash), segment_entity(segment_hash)],
        activity: creation_activity(action),
        agent: agent.clone(),
        relations: vec![
            generated_by(time),
            associated_with(agent),
            Relation::Used {
                activity: ACTIVITY_ID.to_string(),
                entity: PRIMARY_ENTITY_ID.to_string(),
            },
            Relation::WasDerivedFrom {
                generated_entity: SEGMENT_ENTITY_ID.to_string(),
                used_entity: PRIMARY_ENTITY_ID.to_string(),
            },
        ],
    })
}

fn primary_entity(content_hash: &str) -> Entity {
    Entity {
        id: PRIMARY_ENTITY_ID.to_string(),
        label: PRIMARY_ENTITY_LABEL.to_string(),
        entity_type: ENTITY_TYPE.to_string(),
        value: content_hash.to_string(),
    }
}

fn segment_entity(segment_hash: &str) -> Entity {
    Entity {
        id: SEGMENT_ENTITY_ID.to_string(),
        label: SEGMENT_ENTITY_LABEL.to_string(),
        entity_type: ENTITY_TYPE.to_string(),
        value: segment_hash.to_string(),
    }
}

fn creation_activity(action: &str) -> Activity {
    Activity {
        id: ACTIVITY_ID.to_string(),
        activity_type: action.to_string(),
    }
}

fn generated_by(time: GenerationTime) -> Relation {
    Relation::WasGeneratedBy {
        entity: PRIMARY_ENTITY_ID.to_string(),
        activity: ACTIVITY_ID.to_string(),
        time,
    }
}

fn associated_with(agent: &Agent) -> Relation {
    Relation::WasAssociatedWith {
        activity: ACTIVITY_ID.to_string(),
        agent: agent.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "2018-11-10T12:15:55.028Z";

    fn agent() -> Agent {
        Agent::new("1.2.3.4", "agentidentifier", "7.8.9", "urn:tiani-spirit:sts")
    }

    #[test]
    fn test_primary_shape() {
        let record = build_primary("H1", &agent(), "ex:CREATE", DATE).unwrap();

        assert_eq!(record.entities.len(), 1);
        assert_eq!(record.primary_entity().unwrap().value, "H1");
        assert_eq!(record.activity.activity_type, "ex:CREATE");
        assert_eq!(record.agent, agent());

        let names: Vec<_> = record.relations.iter().map(Relation::name).collect();
        assert_eq!(
            names,
            vec!["wasGeneratedBy", "wasAssociatedWith", "wasAttributedTo"]
        );
        assert!(record.check_references().is_ok());
        assert!(!record.is_segmented());
    }

    #[test]
    fn test_segment_shape() {
        let record = build_segment("S1", "H1", &agent(), "ex:CREATE", DATE).unwrap();

        assert_eq!(record.entities.len(), 2);
        assert_eq!(record.primary_entity().unwrap().value, "H1");
        let segment = record.segment_entity().unwrap();
        assert_eq!(segment.value, "S1");
        assert_eq!(segment.label, "The CDA Segment");

        let names: Vec<_> = record.relations.iter().map(Relation::name).collect();
        assert_eq!(
            names,
            vec!["wasGeneratedBy", "wasAssociatedWith", "used", "wasDerivedFrom"]
        );
        assert!(record.check_references().is_ok());
        assert!(record.is_segmented());
    }

    #[test]
    fn test_generation_time_is_kept_verbatim() {
        let record = build_primary("H1", &agent(), "ex:CREATE", DATE).unwrap();
        match &record.relations[0] {
            Relation::WasGeneratedBy { time, .. } => assert_eq!(time.as_str(), DATE),
            other => panic!("unexpected first relation: {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp_fails_both_shapes() {
        let bad = "2006-01-02T15:04:05";
        assert!(matches!(
            build_primary("H1", &agent(), "ex:CREATE", bad),
            Err(DomainError::TimestampFormat { .. })
        ));
        assert!(matches!(
            build_segment("S1", "H1", &agent(), "ex:CREATE", bad),
            Err(DomainError::TimestampFormat { .. })
        ));
    }

    #[test]
    fn test_builds_are_deterministic() {
        let a = build_segment("S1", "H1", &agent(), "ex:UPDATE", DATE).unwrap();
        let b = build_segment("S1", "H1", &agent(), "ex:UPDATE", DATE).unwrap();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every built record satisfies the reference invariant
        #[test]
        fn test_references_always_resolve(
            hash in "[A-Za-z0-9+/=]{1,44}",
            segment in "[A-Za-z0-9+/=]{1,44}",
            agent_id in "[a-z0-9:.]{1,20}",
            action in "ex:[A-Z]{1,10}",
        ) {
            let agent = Agent::new("1.2.3.4", agent_id, "name", "idp");
            let date = "2017-11-21T10:29:49.816Z";

            let primary = build_primary(&hash, &agent, &action, date).unwrap();
            prop_assert!(primary.check_references().is_ok());

            let seg = build_segment(&segment, &hash, &agent, &action, date).unwrap();
            prop_assert!(seg.check_references().is_ok());
            prop_assert_eq!(&seg.primary_entity().unwrap().value, &hash);
        }

        /// Property: a timestamp without milliseconds is always rejected
        #[test]
        fn test_second_precision_rejected(
            y in 1000u32..9999, mo in 1u32..=12, d in 1u32..=28,
            h in 0u32..24, mi in 0u32..60, s in 0u32..60,
        ) {
            let date = format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", y, mo, d, h, mi, s);
            let agent = Agent::new("t", "id", "n", "idp");
            prop_assert!(build_primary("H", &agent, "ex:CREATE", &date).is_err());
        }
    }
}

//! Provenance graph model
//!
//! A [`ProvenanceRecord`] is the fixed-shape W3C PROV graph stored for one
//! document or document segment. Node ids are constants scoped to a single
//! record: a record never holds more than one node of each kind, so they
//! cannot collide.

use crate::{Agent, GenerationTime};

/// Node id of the primary (whole document) entity
pub const PRIMARY_ENTITY_ID: &str = "theobject";

/// Node id of the segment entity in a segmented record
pub const SEGMENT_ENTITY_ID: &str = "thesegment";

/// Node id of the creation activity
pub const ACTIVITY_ID: &str = "theobjectcreation";

/// Label of the primary entity
pub const PRIMARY_ENTITY_LABEL: &str = "The object document";

/// Label of the segment entity
pub const SEGMENT_ENTITY_LABEL: &str = "The CDA Segment";

/// Type tag carried by every entity
pub const ENTITY_TYPE: &str = "XML";

/// A PROV entity: the thing whose provenance is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Node id, unique within the record
    pub id: String,

    /// Human readable label
    pub label: String,

    /// Type tag
    pub entity_type: String,

    /// Entity value: the content hash supplied by the caller
    pub value: String,
}

/// The PROV activity that produced the primary entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Node id
    pub id: String,

    /// Action performed (e.g., "ex:CREATE")
    pub activity_type: String,
}

/// A directed PROV relation between two nodes
///
/// Endpoints are node ids; [`ProvenanceRecord::check_references`] verifies
/// that each one resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// The entity was generated by the activity at `time`
    WasGeneratedBy {
        /// Generated entity
        entity: String,
        /// Generating activity
        activity: String,
        /// Generation time
        time: GenerationTime,
    },

    /// The activity was carried out by the agent
    WasAssociatedWith {
        /// Activity
        activity: String,
        /// Responsible agent
        agent: String,
    },

    /// The entity is attributed to the agent
    WasAttributedTo {
        /// Attributed entity
        entity: String,
        /// Agent
        agent: String,
    },

    /// The activity used the entity
    Used {
        /// Using activity
        activity: String,
        /// Used entity
        entity: String,
    },

    /// The generated entity was derived from the used entity
    WasDerivedFrom {
        /// Derived entity
        generated_entity: String,
        /// Source entity
        used_entity: String,
    },
}

impl Relation {
    /// PROV element name of this relation, without prefix
    pub fn name(&self) -> &'static str {
        match self {
            Relation::WasGeneratedBy { .. } => "wasGeneratedBy",
            Relation::WasAssociatedWith { .. } => "wasAssociatedWith",
            Relation::WasAttributedTo { .. } => "wasAttributedTo",
            Relation::Used { .. } => "used",
            Relation::WasDerivedFrom { .. } => "wasDerivedFrom",
        }
    }

    /// Node ids this relation points at, in element order
    pub fn endpoints(&self) -> [&str; 2] {
        match self {
            Relation::WasGeneratedBy {
                entity, activity, ..
            } => [entity.as_str(), activity.as_str()],
            Relation::WasAssociatedWith { activity, agent } => [activity.as_str(), agent.as_str()],
            Relation::WasAttributedTo { entity, agent } => [entity.as_str(), agent.as_str()],
            Relation::Used { activity, entity } => [activity.as_str(), entity.as_str()],
            Relation::WasDerivedFrom {
                generated_entity,
                used_entity,
            } => [generated_entity.as_str(), used_entity.as_str()],
        }
    }
}

/// The provenance graph of one document or segment
///
/// Built once per write by [`crate::build_primary`] or
/// [`crate::build_segment`], serialized immediately and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceRecord {
    /// Entities in creation order (primary first)
    pub entities: Vec<Entity>,

    /// The creation activity
    pub activity: Activity,

    /// The responsible agent
    pub agent: Agent,

    /// Relations in document order
    pub relations: Vec<Relation>,
}

impl ProvenanceRecord {
    /// Whether this record describes a segment of a larger document
    pub fn is_segmented(&self) -> bool {
        self.entities.iter().any(|e| e.id == SEGMENT_ENTITY_ID)
    }

    /// The primary entity, if present
    pub fn primary_entity(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == PRIMARY_ENTITY_ID)
    }

    /// The segment entity, if present
    pub fn segment_entity(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == SEGMENT_ENTITY_ID)
    }

    /// Ids of every node in the graph
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entities.iter().map(|e| e.id.as_str()).collect();
        ids.push(&self.activity.id);
        ids.push(&self.agent.id);
        ids
    }

    /// Verify that every relation endpoint names a node of this graph
    ///
    /// # Errors
    /// Returns the first dangling node id.
    pub fn check_references(&self) -> Result<(), String> {
        let ids = self.node_ids();
        for relation in &self.relations {
            for endpoint in relation.endpoints() {
                if !ids.contains(&endpoint) {
                    return Err(format!(
                        "{} references unknown node '{}'",
                        relation.name(),
                        endpoint
                    ));
                }
            }
        }
        Ok(())
    }
}

//! Agent and location value types decoded from a write request

/// The party (clinician, system, service) that performed an action
///
/// Immutable once constructed; a fresh value is decoded for every write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Agent {
    /// Agent type code (e.g., an OID such as "1.2.3.4")
    pub agent_type: String,

    /// Agent identifier, also used as the agent node id in the graph
    pub id: String,

    /// Human readable agent name
    pub name: String,

    /// Identity provider that vouches for the agent
    pub identity_provider: String,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        agent_type: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        identity_provider: impl Into<String>,
    ) -> Self {
        Self {
            agent_type: agent_type.into(),
            id: id.into(),
            name: name.into(),
            identity_provider: identity_provider.into(),
        }
    }
}

/// Where an action occurred
///
/// Decoded from every write request but not part of the provenance graph;
/// callers that need it track it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Location identifier
    pub id: String,

    /// Location name (e.g., "General Hospital")
    pub name: String,

    /// Locality (e.g., "Nashville, TN")
    pub locality: String,

    /// Identifier of the document handled at this location
    pub doc_id: String,
}

impl Location {
    /// Create a new location
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        locality: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locality: locality.into(),
            doc_id: doc_id.into(),
        }
    }
}

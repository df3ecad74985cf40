//! PROV-XML document encoding
//!
//! [`serialize`] renders a [`ProvenanceRecord`] in the exact layout
//! downstream PROV validators were built against: compact output, one
//! `prov:document` root, entities, the activity, the agent, then relations.
//! Namespace declarations are repeated on every element that uses them and
//! are never hoisted to the root. Changing either the order or the repetition
//! breaks those consumers.
//!
//! [`parse_document`] reads such a document back into a record. It compares
//! structure, not bytes.

use crate::DocumentError;
use provledger_domain::{
    Activity, Agent, Entity, GenerationTime, ProvenanceRecord, Relation,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// W3C PROV namespace
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";

/// XML Schema instance namespace
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Example namespace bound to `ex:` on the root
pub const EX_NS: &str = "urn:tiani:prova";

/// Namespace of the healthcare provider directory elements
pub const HPD_NS: &str = "IHEHPD";

/// Namespace of the identity provider element
pub const IDP_NS: &str = "idp";

const DOCUMENT: &str = "prov:document";
const ENTITY: &str = "prov:entity";
const ACTIVITY: &str = "prov:activity";
const AGENT: &str = "prov:agent";
const LABEL: &str = "prov:label";
const LOCATION: &str = "prov:location";
const TYPE: &str = "prov:type";
const VALUE: &str = "prov:value";
const TIME: &str = "prov:time";
const DOCTOR_ID: &str = "hpd:doctorid";
const DOCTOR_NAME: &str = "hpd:doctorname";
const IDP: &str = "hpd:idp";
const GENERATED_ENTITY: &str = "prov:generatedEntity";
const USED_ENTITY: &str = "prov:usedEntity";

/// Render a record as a PROV-XML document
///
/// # Errors
/// Only if the XML writer itself fails, which writing to memory does not do
/// in practice.
///
/// # Examples
///
/// ```
/// use provledger_contract::document::serialize;
/// use provledger_domain::{build_primary, Agent};
///
/// let agent = Agent::new("1.2.3.4", "A1", "Dr X", "urn:idp");
/// let record = build_primary("H1", &agent, "ex:CREATE", "2018-11-10T12:15:55.028Z").unwrap();
/// let xml = serialize(&record).unwrap();
/// assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><prov:document"#));
/// assert!(xml.contains("<prov:type>ex:CREATE</prov:type>"));
/// ```
pub fn serialize(record: &ProvenanceRecord) -> Result<String, DocumentError> {
    let mut w = DocWriter::new();

    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.open(
        DOCUMENT,
        &[("xmlns:prov", PROV_NS), ("xmlns:xsi", XSI_NS), ("xmlns:ex", EX_NS)],
    )?;

    for entity in &record.entities {
        w.write_entity(entity)?;
    }
    w.write_activity(&record.activity)?;
    w.write_agent(&record.agent)?;
    for relation in &record.relations {
        w.write_relation(relation)?;
    }

    w.close(DOCUMENT)?;
    w.finish()
}

/// Thin wrapper that maps writer failures and knows the PROV element shapes
struct DocWriter {
    inner: Writer<Vec<u8>>,
}

impl DocWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), DocumentError> {
        self.inner
            .write_event(event)
            .map_err(|e| DocumentError::Write(e.to_string()))
    }

    fn start<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        start
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), DocumentError> {
        self.event(Event::Start(Self::start(name, attributes)))
    }

    fn close(&mut self, name: &str) -> Result<(), DocumentError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), DocumentError> {
        self.event(Event::Empty(Self::start(name, attributes)))
    }

    /// Element holding only text; self-closing when the text is empty
    fn text(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<(), DocumentError> {
        if text.is_empty() {
            return self.empty(name, attributes);
        }
        self.open(name, attributes)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    /// Node declaration: `<name xmlns:ns1=PROV ns1:id=id>`
    fn open_node(&mut self, name: &str, id: &str) -> Result<(), DocumentError> {
        self.open(name, &[("xmlns:ns1", PROV_NS), ("ns1:id", id)])
    }

    /// Relation endpoint: `<name xmlns:ns1=PROV ns1:ref=target/>`
    fn reference(&mut self, name: &str, target: &str) -> Result<(), DocumentError> {
        self.empty(name, &[("xmlns:ns1", PROV_NS), ("ns1:ref", target)])
    }

    fn write_entity(&mut self, entity: &Entity) -> Result<(), DocumentError> {
        self.open_node(ENTITY, &entity.id)?;
        self.text(LABEL, &[], &entity.label)?;
        self.empty(LOCATION, &[])?;
        self.text(TYPE, &[], &entity.entity_type)?;
        self.text(VALUE, &[], &entity.value)?;
        self.close(ENTITY)
    }

    fn write_activity(&mut self, activity: &Activity) -> Result<(), DocumentError> {
        self.open_node(ACTIVITY, &activity.id)?;
        self.text(TYPE, &[], &activity.activity_type)?;
        self.close(ACTIVITY)
    }

    fn write_agent(&mut self, agent: &Agent) -> Result<(), DocumentError> {
        self.open_node(AGENT, &agent.id)?;
        self.text(TYPE, &[], &agent.agent_type)?;
        self.text(DOCTOR_ID, &[("xmlns:hpd", HPD_NS)], &agent.id)?;
        self.text(DOCTOR_NAME, &[("xmlns:hpd", HPD_NS)], &agent.name)?;
        self.text(IDP, &[("xmlns:hpd", IDP_NS)], &agent.identity_provider)?;
        self.close(AGENT)
    }

    fn write_relation(&mut self, relation: &Relation) -> Result<(), DocumentError> {
        let name = format!("prov:{}", relation.name());
        self.open(&name, &[])?;
        match relation {
            Relation::WasGeneratedBy {
                entity,
                activity,
                time,
            } => {
                self.reference(ENTITY, entity)?;
                self.reference(ACTIVITY, activity)?;
                self.text(TIME, &[], time.as_str())?;
            }
            Relation::WasAssociatedWith { activity, agent } => {
                self.reference(ACTIVITY, activity)?;
                self.reference(AGENT, agent)?;
            }
            Relation::WasAttributedTo { entity, agent } => {
                self.reference(ENTITY, entity)?;
                self.reference(AGENT, agent)?;
            }
            Relation::Used { activity, entity } => {
                self.reference(ACTIVITY, activity)?;
                self.reference(ENTITY, entity)?;
            }
            Relation::WasDerivedFrom {
                generated_entity,
                used_entity,
            } => {
                self.reference(GENERATED_ENTITY, generated_entity)?;
                self.reference(USED_ENTITY, used_entity)?;
            }
        }
        self.close(&name)
    }

    fn finish(self) -> Result<String, DocumentError> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| DocumentError::Write(e.to_string()))
    }
}

/// Read a PROV-XML document produced by [`serialize`] back into a record
///
/// # Errors
/// [`DocumentError::Malformed`] for XML errors, unexpected elements or
/// dangling relation endpoints; [`DocumentError::MissingElement`] when a
/// required element is absent; [`DocumentError::Time`] for a bad
/// generation time.
pub fn parse_document(xml: &str) -> Result<ProvenanceRecord, DocumentError> {
    let root = read_tree(xml)?;
    if root.name != DOCUMENT {
        return Err(DocumentError::Malformed(format!(
            "root element is '{}', expected '{}'",
            root.name, DOCUMENT
        )));
    }

    let mut entities = Vec::new();
    let mut activity = None;
    let mut agent = None;
    let mut relations = Vec::new();

    for node in &root.children {
        match node.name.as_str() {
            ENTITY => entities.push(Entity {
                id: node.required_attr("ns1:id")?.to_string(),
                label: node.child_text(LABEL)?,
                entity_type: node.child_text(TYPE)?,
                value: node.child_text(VALUE)?,
            }),
            ACTIVITY => {
                activity = Some(Activity {
                    id: node.required_attr("ns1:id")?.to_string(),
                    activity_type: node.child_text(TYPE)?,
                })
            }
            AGENT => {
                agent = Some(Agent {
                    agent_type: node.child_text(TYPE)?,
                    id: node.required_attr("ns1:id")?.to_string(),
                    name: node.child_text(DOCTOR_NAME)?,
                    identity_provider: node.child_text(IDP)?,
                })
            }
            "prov:wasGeneratedBy" => relations.push(Relation::WasGeneratedBy {
                entity: node.child_ref(ENTITY)?,
                activity: node.child_ref(ACTIVITY)?,
                time: GenerationTime::parse(&node.child_text(TIME)?)?,
            }),
            "prov:wasAssociatedWith" => relations.push(Relation::WasAssociatedWith {
                activity: node.child_ref(ACTIVITY)?,
                agent: node.child_ref(AGENT)?,
            }),
            "prov:wasAttributedTo" => relations.push(Relation::WasAttributedTo {
                entity: node.child_ref(ENTITY)?,
                agent: node.child_ref(AGENT)?,
            }),
            "prov:used" => relations.push(Relation::Used {
                activity: node.child_ref(ACTIVITY)?,
                entity: node.child_ref(ENTITY)?,
            }),
            "prov:wasDerivedFrom" => relations.push(Relation::WasDerivedFrom {
                generated_entity: node.child_ref(GENERATED_ENTITY)?,
                used_entity: node.child_ref(USED_ENTITY)?,
            }),
            other => {
                return Err(DocumentError::Malformed(format!(
                    "unexpected element '{}'",
                    other
                )))
            }
        }
    }

    let record = ProvenanceRecord {
        entities,
        activity: activity.ok_or_else(|| DocumentError::MissingElement(ACTIVITY.to_string()))?,
        agent: agent.ok_or_else(|| DocumentError::MissingElement(AGENT.to_string()))?,
        relations,
    };
    record.check_references().map_err(DocumentError::Malformed)?;
    Ok(record)
}

/// Minimal element tree; PROV documents are small
#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DocumentError> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(malformed)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(malformed)?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required_attr(&self, key: &str) -> Result<&str, DocumentError> {
        self.attr(key).ok_or_else(|| {
            DocumentError::Malformed(format!("<{}> has no {} attribute", self.name, key))
        })
    }

    fn child(&self, name: &str) -> Result<&XmlNode, DocumentError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DocumentError::MissingElement(format!("{} in <{}>", name, self.name)))
    }

    fn child_text(&self, name: &str) -> Result<String, DocumentError> {
        Ok(self.child(name)?.text.clone())
    }

    fn child_ref(&self, name: &str) -> Result<String, DocumentError> {
        Ok(self.child(name)?.required_attr("ns1:ref")?.to_string())
    }
}

fn malformed(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Malformed(e.to_string())
}

fn read_tree(xml: &str) -> Result<XmlNode, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => stack.push(XmlNode::from_start(&start)?),
            Event::Empty(start) => {
                let node = XmlNode::from_start(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(malformed)?);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Malformed("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            // declaration, comments, processing instructions
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::Malformed(format!("<{}> is never closed", open.name)));
    }
    root.ok_or_else(|| DocumentError::Malformed("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => {
            return Err(DocumentError::Malformed("more than one root element".to_string()))
        }
        None => *root = Some(node),
    }
    Ok(())
}

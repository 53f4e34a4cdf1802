//! Graph projection adapter
//!
//! Turns graph segments (start entity, relationship, end entity) into the flat
//! `{nodes, links}` model drawn by force-directed widgets. The adapter is a pure
//! function of its input; both the path endpoint and the full-network endpoint
//! go through [`project`] and share [`normalize_identity`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Identity of an entity as reported by a graph store.
///
/// Drivers whose native integers overflow the client's safe range report a
/// structured value such as `{"low": 7, "high": 0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawIdentity {
    Number(Number),
    String(String),
    Structured(Value),
}

impl From<u64> for RawIdentity {
    fn from(id: u64) -> Self {
        RawIdentity::Number(id.into())
    }
}

impl From<&str> for RawIdentity {
    fn from(id: &str) -> Self {
        RawIdentity::String(id.to_string())
    }
}

/// Canonical string form of an identity.
///
/// Strings and numbers are stringified directly. A structured identity with a
/// `low` component maps to that component; any other structure maps to its
/// compact JSON serialization.
pub fn normalize_identity(identity: &RawIdentity) -> String {
    match identity {
        RawIdentity::String(s) => s.clone(),
        RawIdentity::Number(n) => n.to_string(),
        RawIdentity::Structured(value) => normalize_value(value),
    }
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(fields) => match fields.get("low") {
            Some(Value::Number(low)) => low.to_string(),
            Some(Value::String(low)) => low.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// A node or relationship endpoint as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub identity: RawIdentity,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Entity {
    pub fn new(identity: impl Into<RawIdentity>) -> Self {
        Self {
            identity: identity.into(),
            labels: Vec::new(),
            properties: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Relationship {
    pub fn new(rel_type: impl Into<String>) -> Self {
        Self {
            rel_type: rel_type.into(),
            properties: Map::new(),
        }
    }
}

/// One `(start, relationship, end)` unit of a traversal result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Entity,
    pub relationship: Relationship,
    pub end: Entity,
}

impl Segment {
    pub fn new(start: Entity, relationship: Relationship, end: Entity) -> Self {
        Self { start, relationship, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedNode {
    pub id: String,
    pub label: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedLink {
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphProjection {
    pub nodes: Vec<ProjectedNode>,
    pub links: Vec<ProjectedLink>,
}

impl GraphProjection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// How entity properties become node captions
#[derive(Debug, Clone)]
pub struct ProjectionOptions {
    /// Property read for the node caption
    pub label_property: String,
    /// Caption used when the property is absent or not a string
    pub default_label: String,
    /// Group used when the entity carries no label
    pub default_group: String,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            label_property: "givenName".to_string(),
            default_label: "Unknown".to_string(),
            default_group: "Person".to_string(),
        }
    }
}

/// Project segments into a deduplicated node set and one link per segment.
///
/// Nodes come out in first-seen order and are never updated by a later
/// sighting of the same id. Links come out in input order.
pub fn project<'a, I>(segments: I, options: &ProjectionOptions) -> GraphProjection
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut nodes: IndexMap<String, ProjectedNode> = IndexMap::new();
    let mut links = Vec::new();

    for segment in segments {
        let source = admit(&mut nodes, &segment.start, options);
        let target = admit(&mut nodes, &segment.end, options);
        links.push(ProjectedLink {
            source,
            target,
            label: segment.relationship.rel_type.clone(),
        });
    }

    GraphProjection {
        nodes: nodes.into_values().collect(),
        links,
    }
}

fn admit(nodes: &mut IndexMap<String, ProjectedNode>, entity: &Entity, options: &ProjectionOptions) -> String {
    let id = normalize_identity(&entity.identity);
    nodes.entry(id.clone()).or_insert_with(|| ProjectedNode {
        id: id.clone(),
        label: entity
            .properties
            .get(&options.label_property)
            .and_then(Value::as_str)
            .unwrap_or(options.default_label.as_str())
            .to_string(),
        group: entity
            .labels
            .first()
            .cloned()
            .unwrap_or_else(|| options.default_group.clone()),
    });
    id
}

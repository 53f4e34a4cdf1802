//! In-memory graph storage
//!
//! Nodes and edges are kept in insertion order so traversals and listings are
//! deterministic; adjacency and label indices give O(1) lookups.

use super::edge::Edge;
use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, Label, NodeId};
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,
    label_index: HashMap<Label, Vec<NodeId>>,
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with a single label and no properties
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        self.create_node_with_properties(vec![label.into()], PropertyMap::new())
    }

    pub fn create_node_with_properties(&mut self, labels: Vec<Label>, properties: PropertyMap) -> NodeId {
        self.next_node_id += 1;
        let id = NodeId::new(self.next_node_id);
        let node = Node::new_with_properties(id, labels, properties);

        for label in &node.labels {
            self.label_index.entry(label.clone()).or_default().push(id);
        }
        self.nodes.insert(id, node);
        id
    }

    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.set_property(key, value);
        Ok(())
    }

    pub fn create_edge(&mut self, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> GraphResult<EdgeId> {
        self.create_edge_with_properties(source, target, edge_type, PropertyMap::new())
    }

    pub fn create_edge_with_properties(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        self.next_edge_id += 1;
        let id = EdgeId::new(self.next_edge_id);
        let mut edge = Edge::new(id, source, target, edge_type);
        edge.properties = properties;

        self.outgoing.entry(source).or_default().push(id);
        self.incoming.entry(target).or_default().push(id);
        self.edge_type_index.entry(edge.edge_type.clone()).or_default().push(id);
        self.edges.insert(id, edge);
        Ok(id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.resolve_edges(self.outgoing.get(&node_id))
    }

    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.resolve_edges(self.incoming.get(&node_id))
    }

    fn resolve_edges(&self, ids: Option<&Vec<EdgeId>>) -> Vec<&Edge> {
        ids.map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Nodes carrying `label`, in creation order
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
            .unwrap_or_default()
    }

    /// Edges of `edge_type`, in creation order
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.resolve_edges(self.edge_type_index.get(edge_type))
    }

    /// First node with `label` whose `key` property equals the given string
    pub fn find_node(&self, label: &Label, key: &str, value: &str) -> Option<&Node> {
        self.get_nodes_by_label(label)
            .into_iter()
            .find(|node| node.get_property(key).and_then(PropertyValue::as_string) == Some(value))
    }

    /// First stored edge joining `a` and `b`, preferring the `a -> b` direction
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.get_outgoing_edges(a)
            .into_iter()
            .find(|e| e.target == b)
            .or_else(|| self.get_outgoing_edges(b).into_iter().find(|e| e.target == a))
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(store: &mut GraphStore, name: &str) -> NodeId {
        let id = store.create_node("Person");
        store.set_node_property(id, "givenName", name).unwrap();
        id
    }

    #[test]
    fn test_create_and_get_node() {
        let mut store = GraphStore::new();
        let id = person(&mut store, "Amine");
        let node = store.get_node(id).unwrap();
        assert_eq!(node.get_property("givenName").and_then(PropertyValue::as_string), Some("Amine"));
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_edge_validation() {
        let mut store = GraphStore::new();
        let a = person(&mut store, "Amine");
        let missing = NodeId::new(999);
        assert_eq!(store.create_edge(a, missing, "KNOWS"), Err(GraphError::InvalidEdgeTarget(missing)));
        assert_eq!(store.create_edge(missing, a, "KNOWS"), Err(GraphError::InvalidEdgeSource(missing)));
        assert_eq!(store.set_node_property(missing, "x", 1i64), Err(GraphError::NodeNotFound(missing)));
    }

    #[test]
    fn test_adjacency_and_type_index() {
        let mut store = GraphStore::new();
        let a = person(&mut store, "Amine");
        let b = person(&mut store, "Hassan");
        let c = person(&mut store, "Said");
        store.create_edge(a, b, "DIRECTS").unwrap();
        store.create_edge(b, c, "DIRECTS").unwrap();
        store.create_edge(a, c, "KNOWS").unwrap();

        assert_eq!(store.get_outgoing_edges(a).len(), 2);
        assert_eq!(store.get_incoming_edges(c).len(), 2);
        assert_eq!(store.get_edges_by_type(&EdgeType::new("DIRECTS")).len(), 2);
        assert!(store.get_edges_by_type(&EdgeType::new("CALLS")).is_empty());
    }

    #[test]
    fn test_multiple_edges_between_nodes() {
        let mut store = GraphStore::new();
        let a = person(&mut store, "Amine");
        let b = person(&mut store, "Hassan");
        let first = store.create_edge(a, b, "DIRECTS").unwrap();
        store.create_edge(a, b, "KNOWS").unwrap();
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.edge_between(a, b).map(|e| e.id), Some(first));
        assert_eq!(store.edge_between(b, a).map(|e| e.id), Some(first));
    }

    #[test]
    fn test_find_node_and_clear() {
        let mut store = GraphStore::new();
        person(&mut store, "Amine");
        let b = person(&mut store, "Hassan");
        assert_eq!(store.find_node(&Label::new("Person"), "givenName", "Hassan").map(|n| n.id), Some(b));
        assert!(store.find_node(&Label::new("Person"), "givenName", "Nobody").is_none());

        store.clear();
        assert_eq!(store.node_count(), 0);
        assert!(store.get_nodes_by_label(&Label::new("Person")).is_empty());
    }
}

//! Mutable in-memory graph model
//!
//! The model is what ingestion produces and what normalization edits. Analyses
//! never read it directly; they take a [`CompressedGraph`] snapshot instead.
//!
//! [`CompressedGraph`]: crate::graph::CompressedGraph

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Scalar attribute value attached to nodes and edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Bool(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Attribute map; ordered so exports are stable
pub type Attributes = BTreeMap<String, AttrValue>;

/// A person or entity in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A weighted, typed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,

    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,

    #[serde(default)]
    pub attributes: Attributes,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: default_weight(),
            relationship_type: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_relationship(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = Some(relationship_type.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Check that a weight is usable as an edge weight
pub fn validate_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidArgument(format!(
            "edge weight must be finite and non-negative, got {}",
            weight
        )))
    }
}

/// Relationship graph with a fixed directedness
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Insert a node, merging name and attributes into an existing node with the same id
    pub fn add_node(&mut self, node: Node) {
        if let Some(&idx) = self.index.get(&node.id) {
            let existing = &mut self.nodes[idx];
            if node.name.is_some() {
                existing.name = node.name;
            }
            existing.attributes.extend(node.attributes);
            return;
        }

        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Get the node with the given id, creating a bare node if absent
    pub fn ensure_node(&mut self, id: &str) {
        if !self.index.contains_key(id) {
            self.add_node(Node::new(id));
        }
    }

    /// Add an edge, creating missing endpoints
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        validate_weight(edge.weight)?;
        self.ensure_node(&edge.source);
        self.ensure_node(&edge.target);
        self.edges.push(edge);
        Ok(())
    }

    /// Remove a node and all incident edges
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = *self.index.get(id)?;
        self.edges.retain(|e| e.source != id && e.target != id);
        let node = self.nodes.remove(idx);
        self.rebuild_index();
        Some(node)
    }

    /// Remove every node whose id is in `ids`, with incident edges; returns the number removed
    pub fn remove_nodes(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        self.rebuild_index();
        before - self.nodes.len()
    }

    /// Remove the edges matching `predicate`; returns the number removed
    pub fn remove_edges_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Edge) -> bool,
    {
        let before = self.edges.len();
        self.edges.retain(|e| !predicate(e));
        before - self.edges.len()
    }

    /// Copy of the graph restricted to the given nodes
    pub fn subgraph(&self, ids: &HashSet<String>) -> Graph {
        let mut sub = Graph::new(self.directed);
        for node in self.nodes.iter().filter(|n| ids.contains(&n.id)) {
            sub.add_node(node.clone());
        }
        sub.edges = self
            .edges
            .iter()
            .filter(|e| ids.contains(&e.source) && ids.contains(&e.target))
            .cloned()
            .collect();
        sub
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_creates_endpoints() {
        let mut graph = Graph::undirected();
        graph.add_edge(Edge::new("a", "b")).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains_node("a"));
        assert_eq!(graph.edges()[0].weight, 1.0);
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        let mut graph = Graph::undirected();
        assert!(graph.add_edge(Edge::new("a", "b").with_weight(-1.0)).is_err());
        assert!(graph.add_edge(Edge::new("a", "b").with_weight(f64::NAN)).is_err());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn add_node_merges_attributes() {
        let mut graph = Graph::undirected();
        graph.add_node(Node::new("a").with_attribute("dept", "eng"));
        graph.add_node(Node::new("a").with_name("Alice").with_attribute("age", 30i64));

        let node = graph.node("a").unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(node.name.as_deref(), Some("Alice"));
        assert_eq!(node.attributes.len(), 2);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut graph = Graph::undirected();
        graph.add_edge(Edge::new("a", "b")).unwrap();
        graph.add_edge(Edge::new("b", "c")).unwrap();
        graph.add_edge(Edge::new("c", "d")).unwrap();

        assert!(graph.remove_node("b").is_some());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.node("c").is_some());
        assert!(graph.remove_node("b").is_none());
    }

    #[test]
    fn attr_value_serializes_untagged() {
        let node = Node::new("x")
            .with_attribute("age", 41i64)
            .with_attribute("active", true)
            .with_attribute("city", "Oslo");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["attributes"]["age"], 41.0);
        assert_eq!(json["attributes"]["active"], true);
        assert_eq!(json["attributes"]["city"], "Oslo");
    }
}

//! Node/link JSON ingestion

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{GraphError, Result};
use crate::graph::{AttrValue, Attributes, Edge, Graph, Node};

const NODE_RESERVED: &[&str] = &["id", "name"];
const EDGE_RESERVED: &[&str] = &[
    "source",
    "target",
    "from",
    "to",
    "weight",
    "value",
    "relationship_type",
    "type",
];

/// Load a graph from a node/link JSON file
pub fn load_json(path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path)?;
    parse_json(&text)
}

/// Parse a node/link JSON document
///
/// Accepts `{"nodes": [...], "edges": [...]}` or the D3 style
/// `{"nodes": [...], "links": [...]}` with an optional `directed` flag.
pub fn parse_json(text: &str) -> Result<Graph> {
    let data: Value = serde_json::from_str(text)?;
    let Some(object) = data.as_object() else {
        return Err(GraphError::MalformedInput(
            "JSON graph must be an object".to_string(),
        ));
    };

    let empty = Vec::new();
    let (nodes, edges) = match (object.get("nodes"), object.get("edges"), object.get("links")) {
        (Some(nodes), Some(edges), _) => (as_array(nodes, "nodes")?, as_array(edges, "edges")?),
        (nodes, _, Some(links)) => {
            let nodes = match nodes {
                Some(nodes) => as_array(nodes, "nodes")?,
                None => &empty,
            };
            (nodes, as_array(links, "links")?)
        }
        _ => {
            return Err(GraphError::MalformedInput(
                "JSON must contain 'nodes' and 'edges' (or 'links') arrays".to_string(),
            ))
        }
    };

    let directed = object
        .get("directed")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut graph = Graph::new(directed);

    for (i, entry) in nodes.iter().enumerate() {
        graph.add_node(parse_node(entry, i)?);
    }
    for (i, entry) in edges.iter().enumerate() {
        let edge = parse_edge(entry, i)?;
        graph
            .add_edge(edge)
            .map_err(|err| GraphError::MalformedInput(format!("edge {}: {}", i, err)))?;
    }

    log::debug!(
        "JSON declared {} nodes and {} edges",
        nodes.len(),
        edges.len()
    );
    Ok(graph)
}

fn as_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| GraphError::MalformedInput(format!("'{}' must be an array", key)))
}

/// Scalar JSON value as an id string
fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn attr_value(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(AttrValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(AttrValue::Number),
        Value::String(s) => Some(AttrValue::Text(s.clone())),
        nested => Some(AttrValue::Text(nested.to_string())),
    }
}

fn collect_attributes(object: &Map<String, Value>, reserved: &[&str]) -> Attributes {
    object
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .filter_map(|(key, value)| attr_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn parse_node(entry: &Value, position: usize) -> Result<Node> {
    let Some(object) = entry.as_object() else {
        return scalar_id(entry)
            .map(Node::new)
            .ok_or_else(|| GraphError::MalformedInput(format!("node {} has no usable id", position)));
    };

    let id = object
        .get("id")
        .or_else(|| object.get("name"))
        .and_then(scalar_id)
        .ok_or_else(|| GraphError::MalformedInput(format!("node {} has no 'id'", position)))?;

    let mut node = Node::new(id);
    node.name = object.get("name").and_then(scalar_id);
    node.attributes = collect_attributes(object, NODE_RESERVED);
    Ok(node)
}

fn parse_edge(entry: &Value, position: usize) -> Result<Edge> {
    if let Some(pair) = entry.as_array() {
        if pair.len() < 2 {
            return Err(GraphError::MalformedInput(format!(
                "edge {} needs two endpoints",
                position
            )));
        }
        let endpoints = (scalar_id(&pair[0]), scalar_id(&pair[1]));
        let (Some(source), Some(target)) = endpoints else {
            return Err(GraphError::MalformedInput(format!(
                "edge {} has non-scalar endpoints",
                position
            )));
        };
        return Ok(Edge::new(source, target));
    }

    let Some(object) = entry.as_object() else {
        return Err(GraphError::MalformedInput(format!(
            "edge {} must be an object or a pair",
            position
        )));
    };

    let endpoint = |primary: &str, fallback: &str| {
        object
            .get(primary)
            .or_else(|| object.get(fallback))
            .and_then(scalar_id)
            .ok_or_else(|| {
                GraphError::MalformedInput(format!("edge {} has no '{}'", position, primary))
            })
    };
    let source = endpoint("source", "from")?;
    let target = endpoint("target", "to")?;

    let weight = match object.get("weight").or_else(|| object.get("value")) {
        None | Some(Value::Null) => 1.0,
        Some(value) => value.as_f64().ok_or_else(|| {
            GraphError::MalformedInput(format!("edge {} weight is not a number", position))
        })?,
    };

    let mut edge = Edge::new(source, target).with_weight(weight);
    edge.relationship_type = object
        .get("relationship_type")
        .or_else(|| object.get("type"))
        .and_then(scalar_id);
    edge.attributes = collect_attributes(object, EDGE_RESERVED);
    Ok(edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_and_edges() {
        let graph = parse_json(
            r#"{
                "directed": false,
                "nodes": [
                    {"id": "r1", "department": "CS", "papers": 25},
                    {"id": "r2", "name": "Ada"},
                    "r3"
                ],
                "edges": [
                    {"source": "r1", "target": "r2", "collaborations": 5},
                    {"from": "r2", "to": "r3", "value": 2.5, "type": "colleague"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let r1 = graph.node("r1").unwrap();
        assert_eq!(r1.attributes["department"], AttrValue::Text("CS".into()));
        assert_eq!(r1.attributes["papers"], AttrValue::Number(25.0));
        assert_eq!(graph.node("r2").unwrap().name.as_deref(), Some("Ada"));

        let second = &graph.edges()[1];
        assert_eq!(second.weight, 2.5);
        assert_eq!(second.relationship_type.as_deref(), Some("colleague"));
        assert_eq!(
            graph.edges()[0].attributes["collaborations"],
            AttrValue::Number(5.0)
        );
    }

    #[test]
    fn parses_links_with_pairs_and_numeric_ids() {
        let graph = parse_json(r#"{"directed": true, "links": [[1, 2], [2, 3]]}"#).unwrap();
        assert!(graph.is_directed());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edges()[0].source, "1");
        assert_eq!(graph.edges()[0].target, "2");
    }

    #[test]
    fn missing_edge_keys_is_malformed() {
        let result = parse_json(r#"{"nodes": ["a"]}"#);
        assert!(matches!(result, Err(GraphError::MalformedInput(_))));
    }

    #[test]
    fn negative_weight_is_malformed() {
        let result = parse_json(r#"{"nodes": [], "edges": [{"source": "a", "target": "b", "weight": -2}]}"#);
        assert!(matches!(result, Err(GraphError::MalformedInput(_))));
    }
}

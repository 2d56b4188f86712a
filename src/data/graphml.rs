//! GraphML ingestion

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{GraphError, Result};
use crate::graph::{AttrValue, Edge, Graph, Node};

/// A `<key>` declaration
#[derive(Debug, Clone)]
struct KeySpec {
    name: String,
    domain: String,
    kind: String,
    default: Option<String>,
}

impl KeySpec {
    fn applies_to(&self, element: &str) -> bool {
        self.domain == element || self.domain == "all"
    }

    fn convert(&self, raw: &str) -> Result<AttrValue> {
        let raw = raw.trim();
        match self.kind.as_str() {
            "boolean" => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(AttrValue::Bool(true)),
                "false" | "0" => Ok(AttrValue::Bool(false)),
                other => Err(GraphError::MalformedInput(format!(
                    "key '{}': '{}' is not a boolean",
                    self.name, other
                ))),
            },
            "int" | "long" | "float" | "double" => raw.parse().map(AttrValue::Number).map_err(|_| {
                GraphError::MalformedInput(format!("key '{}': '{}' is not a number", self.name, raw))
            }),
            _ => Ok(AttrValue::Text(raw.to_string())),
        }
    }
}

/// Element whose `<data>` children are being collected
enum Pending {
    Node(Node, Vec<String>),
    Edge(Edge, Vec<String>),
}

fn xml_error(err: impl fmt::Display) -> GraphError {
    GraphError::MalformedInput(format!("invalid GraphML: {}", err))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(element: &BytesStart<'_>, name: &str, tag: &str) -> Result<String> {
    attribute(element, name)?
        .ok_or_else(|| GraphError::MalformedInput(format!("<{}> without '{}'", tag, name)))
}

/// Load a graph from a GraphML file
pub fn load_graphml(path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path)?;
    parse_graphml(&text)
}

/// Parse a GraphML document, keeping directedness and every declared attribute
///
/// The `name` node key fills the display name; the `weight` and
/// `relationship_type` edge keys fill the matching edge fields.
pub fn parse_graphml(text: &str) -> Result<Graph> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut keys: HashMap<String, KeySpec> = HashMap::new();
    let mut graph: Option<Graph> = None;
    let mut pending: Option<Pending> = None;
    let mut current_key: Option<String> = None;
    let mut in_default = false;
    let mut data_key: Option<String> = None;
    let mut text_buf = String::new();

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        let is_empty = matches!(event, Event::Empty(_));

        match event {
            Event::Start(element) | Event::Empty(element) => {
                match element.local_name().as_ref() {
                    b"key" => {
                        let id = required_attribute(&element, "id", "key")?;
                        let spec = KeySpec {
                            name: attribute(&element, "attr.name")?.unwrap_or_else(|| id.clone()),
                            domain: attribute(&element, "for")?.unwrap_or_else(|| "all".to_string()),
                            kind: attribute(&element, "attr.type")?.unwrap_or_else(|| "string".to_string()),
                            default: None,
                        };
                        keys.insert(id.clone(), spec);
                        if !is_empty {
                            current_key = Some(id);
                        }
                    }
                    b"default" if current_key.is_some() => {
                        in_default = !is_empty;
                        text_buf.clear();
                    }
                    b"graph" => {
                        if graph.is_some() {
                            log::warn!("Nested or repeated <graph> elements are merged into the first");
                        } else {
                            let directed = attribute(&element, "edgedefault")?.as_deref() == Some("directed");
                            graph = Some(Graph::new(directed));
                        }
                    }
                    b"node" => {
                        let node = Node::new(required_attribute(&element, "id", "node")?);
                        pending = Some(Pending::Node(node, Vec::new()));
                        if is_empty {
                            finish_pending(&mut pending, &mut graph, &keys)?;
                        }
                    }
                    b"edge" => {
                        let source = required_attribute(&element, "source", "edge")?;
                        let target = required_attribute(&element, "target", "edge")?;
                        pending = Some(Pending::Edge(Edge::new(source, target), Vec::new()));
                        if is_empty {
                            finish_pending(&mut pending, &mut graph, &keys)?;
                        }
                    }
                    b"data" => {
                        data_key = Some(required_attribute(&element, "key", "data")?);
                        text_buf.clear();
                        if is_empty {
                            apply_data(&mut pending, data_key.take(), "", &keys)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(content) => {
                if data_key.is_some() || in_default {
                    text_buf.push_str(&content.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(content) => {
                if data_key.is_some() || in_default {
                    text_buf.push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
            }
            Event::End(element) => match element.local_name().as_ref() {
                b"default" => {
                    if let Some(spec) = current_key.as_ref().and_then(|id| keys.get_mut(id)) {
                        spec.default = Some(text_buf.clone());
                    }
                    in_default = false;
                }
                b"key" => current_key = None,
                b"data" => {
                    let value = std::mem::take(&mut text_buf);
                    apply_data(&mut pending, data_key.take(), &value, &keys)?;
                }
                b"node" | b"edge" => finish_pending(&mut pending, &mut graph, &keys)?,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    graph.ok_or_else(|| GraphError::MalformedInput("GraphML has no <graph> element".to_string()))
}

/// Store one `<data>` value on the pending node or edge
fn apply_data(
    pending: &mut Option<Pending>,
    key: Option<String>,
    raw: &str,
    keys: &HashMap<String, KeySpec>,
) -> Result<()> {
    let (Some(key), Some(pending)) = (key, pending.as_mut()) else {
        return Ok(());
    };
    let spec = keys.get(&key).cloned().unwrap_or_else(|| KeySpec {
        name: key.clone(),
        domain: "all".to_string(),
        kind: "string".to_string(),
        default: None,
    });

    match pending {
        Pending::Node(node, seen) => {
            if spec.name == "name" {
                node.name = Some(raw.trim().to_string());
            } else {
                node.attributes.insert(spec.name.clone(), spec.convert(raw)?);
            }
            seen.push(key);
        }
        Pending::Edge(edge, seen) => {
            match spec.name.as_str() {
                "weight" => {
                    edge.weight = spec
                        .convert(raw)?
                        .as_f64()
                        .ok_or_else(|| GraphError::MalformedInput(format!("edge weight '{}' is not a number", raw)))?;
                }
                "relationship_type" => edge.relationship_type = Some(raw.trim().to_string()),
                _ => {
                    edge.attributes.insert(spec.name.clone(), spec.convert(raw)?);
                }
            }
            seen.push(key);
        }
    }
    Ok(())
}

/// Fill key defaults and add the pending element to the graph
fn finish_pending(
    pending: &mut Option<Pending>,
    graph: &mut Option<Graph>,
    keys: &HashMap<String, KeySpec>,
) -> Result<()> {
    let Some(element) = pending.take() else {
        return Ok(());
    };
    let Some(graph) = graph.as_mut() else {
        return Err(GraphError::MalformedInput(
            "<node> or <edge> outside of <graph>".to_string(),
        ));
    };

    let (domain, seen) = match &element {
        Pending::Node(_, seen) => ("node", seen.clone()),
        Pending::Edge(_, seen) => ("edge", seen.clone()),
    };

    let mut element = Some(element);
    for (id, spec) in keys {
        if !spec.applies_to(domain) || seen.contains(id) {
            continue;
        }
        if let Some(default) = &spec.default {
            apply_data(&mut element, Some(id.clone()), default, keys)?;
        }
    }

    match element {
        Some(Pending::Node(node, _)) => graph.add_node(node),
        Some(Pending::Edge(edge, _)) => graph
            .add_edge(edge)
            .map_err(|err| GraphError::MalformedInput(err.to_string()))?,
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="name" attr.type="string"/>
  <key id="d1" for="node" attr.name="age" attr.type="int"/>
  <key id="d2" for="edge" attr.name="weight" attr.type="double">
    <default>1.0</default>
  </key>
  <key id="d3" for="edge" attr.name="relationship_type" attr.type="string"/>
  <key id="d4" for="node" attr.name="active" attr.type="boolean"/>
  <graph id="G" edgedefault="directed">
    <node id="a"><data key="d0">Alice &amp; co</data><data key="d1">34</data></node>
    <node id="b"><data key="d4">true</data></node>
    <node id="c"/>
    <edge source="a" target="b"><data key="d2">0.25</data><data key="d3">friend</data></edge>
    <edge source="b" target="c"/>
  </graph>
</graphml>"#;

    #[test]
    fn parses_attributes_and_direction() {
        let graph = parse_graphml(SAMPLE).unwrap();

        assert!(graph.is_directed());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let a = graph.node("a").unwrap();
        assert_eq!(a.name.as_deref(), Some("Alice & co"));
        assert_eq!(a.attributes["age"], AttrValue::Number(34.0));
        assert_eq!(graph.node("b").unwrap().attributes["active"], AttrValue::Bool(true));

        let first = &graph.edges()[0];
        assert_eq!(first.weight, 0.25);
        assert_eq!(first.relationship_type.as_deref(), Some("friend"));
        assert_eq!(graph.edges()[1].weight, 1.0);
    }

    #[test]
    fn missing_graph_element_is_malformed() {
        let result = parse_graphml(r#"<graphml></graphml>"#);
        assert!(matches!(result, Err(GraphError::MalformedInput(_))));
    }

    #[test]
    fn broken_xml_is_malformed() {
        let result = parse_graphml(r#"<graphml><graph><node id="a"></graph>"#);
        assert!(result.is_err());
    }
}

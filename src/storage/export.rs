//! Graph export to GraphML and node-link JSON

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::escape::escape;
use serde_json::{json, to_string_pretty, Map, Value};

use crate::error::Result;
use crate::graph::{AttrValue, Attributes, Graph};

/// GraphML `attr.type` for a set of values of one attribute
fn attr_type<'a>(values: impl Iterator<Item = &'a AttrValue>) -> &'static str {
    let mut kind = None;
    for value in values {
        let this = match value {
            AttrValue::Bool(_) => "boolean",
            AttrValue::Number(_) => "double",
            AttrValue::Text(_) => "string",
        };
        match kind {
            None => kind = Some(this),
            Some(seen) if seen != this => return "string",
            _ => {}
        }
    }
    kind.unwrap_or("string")
}

/// Declared `<key>`: GraphML id and type by attribute name
fn collect_keys<'a>(
    maps: impl Iterator<Item = &'a Attributes> + Clone,
    prefix: &str,
    start: usize,
) -> BTreeMap<String, (String, &'static str)> {
    let names: Vec<&String> = maps.clone().flat_map(|attrs| attrs.keys()).collect();
    let mut keys = BTreeMap::new();
    for name in names {
        if keys.contains_key(name) {
            continue;
        }
        let kind = attr_type(maps.clone().filter_map(|attrs| attrs.get(name)));
        let id = format!("{}{}", prefix, start + keys.len());
        keys.insert(name.clone(), (id, kind));
    }
    keys
}

fn write_data<W: Write>(
    writer: &mut W,
    keys: &BTreeMap<String, (String, &'static str)>,
    attributes: &Attributes,
) -> Result<()> {
    for (name, value) in attributes {
        if let Some((id, _)) = keys.get(name) {
            writeln!(
                writer,
                "      <data key=\"{}\">{}</data>",
                id,
                escape(&value.to_string())
            )?;
        }
    }
    Ok(())
}

/// Serialize a graph as GraphML, keeping names, weights, labels and typed attributes
pub fn render_graphml<W: Write>(graph: &Graph, writer: &mut W) -> Result<()> {
    let node_keys = collect_keys(graph.nodes().iter().map(|n| &n.attributes), "n", 0);
    let edge_keys = collect_keys(graph.edges().iter().map(|e| &e.attributes), "e", 0);
    let has_names = graph.nodes().iter().any(|n| n.name.is_some());
    let has_labels = graph.edges().iter().any(|e| e.relationship_type.is_some());

    writeln!(writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(writer, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    if has_names {
        writeln!(
            writer,
            "  <key id=\"name\" for=\"node\" attr.name=\"name\" attr.type=\"string\"/>"
        )?;
    }
    for (name, (id, kind)) in &node_keys {
        writeln!(
            writer,
            "  <key id=\"{}\" for=\"node\" attr.name=\"{}\" attr.type=\"{}\"/>",
            id,
            escape(name),
            kind
        )?;
    }
    writeln!(
        writer,
        "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>"
    )?;
    if has_labels {
        writeln!(
            writer,
            "  <key id=\"relationship_type\" for=\"edge\" attr.name=\"relationship_type\" attr.type=\"string\"/>"
        )?;
    }
    for (name, (id, kind)) in &edge_keys {
        writeln!(
            writer,
            "  <key id=\"{}\" for=\"edge\" attr.name=\"{}\" attr.type=\"{}\"/>",
            id,
            escape(name),
            kind
        )?;
    }

    let edgedefault = if graph.is_directed() { "directed" } else { "undirected" };
    writeln!(writer, "  <graph id=\"G\" edgedefault=\"{}\">", edgedefault)?;

    for node in graph.nodes() {
        writeln!(writer, "    <node id=\"{}\">", escape(&node.id))?;
        if let Some(name) = &node.name {
            writeln!(writer, "      <data key=\"name\">{}</data>", escape(name))?;
        }
        write_data(writer, &node_keys, &node.attributes)?;
        writeln!(writer, "    </node>")?;
    }

    for (i, edge) in graph.edges().iter().enumerate() {
        writeln!(
            writer,
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\">",
            i,
            escape(&edge.source),
            escape(&edge.target)
        )?;
        writeln!(writer, "      <data key=\"weight\">{}</data>", edge.weight)?;
        if let Some(label) = &edge.relationship_type {
            writeln!(
                writer,
                "      <data key=\"relationship_type\">{}</data>",
                escape(label)
            )?;
        }
        write_data(writer, &edge_keys, &edge.attributes)?;
        writeln!(writer, "    </edge>")?;
    }

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</graphml>")?;
    Ok(())
}

/// Write a graph to a GraphML file
pub fn write_graphml(graph: &Graph, path: &Path) -> Result<()> {
    log::info!("Exporting graph to GraphML: {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    render_graphml(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn attributes_json(attributes: &Attributes, object: &mut Map<String, Value>) -> Result<()> {
    for (name, value) in attributes {
        object.insert(name.clone(), serde_json::to_value(value)?);
    }
    Ok(())
}

/// Node-link JSON document of a graph, readable by the JSON loader
pub fn graph_to_json(graph: &Graph) -> Result<Value> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let mut object = Map::new();
        attributes_json(&node.attributes, &mut object)?;
        object.insert("id".to_string(), json!(node.id));
        if let Some(name) = &node.name {
            object.insert("name".to_string(), json!(name));
        }
        nodes.push(Value::Object(object));
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for edge in graph.edges() {
        let mut object = Map::new();
        attributes_json(&edge.attributes, &mut object)?;
        object.insert("source".to_string(), json!(edge.source));
        object.insert("target".to_string(), json!(edge.target));
        object.insert("weight".to_string(), json!(edge.weight));
        if let Some(label) = &edge.relationship_type {
            object.insert("relationship_type".to_string(), json!(label));
        }
        edges.push(Value::Object(object));
    }

    Ok(json!({
        "directed": graph.is_directed(),
        "nodes": nodes,
        "edges": edges,
    }))
}

/// Write a graph to a node-link JSON file
pub fn write_json(graph: &Graph, path: &Path) -> Result<()> {
    log::info!("Exporting graph to JSON: {}", path.display());
    let document = graph_to_json(graph)?;
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&document)?.as_bytes())?;
    Ok(())
}

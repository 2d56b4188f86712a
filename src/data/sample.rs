//! Synthetic and bundled sample graphs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, to_string_pretty};

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, Node};
use crate::storage::export;

const LOCATIONS: [&str; 5] = ["NYC", "LA", "Chicago", "Houston", "Phoenix"];
const RELATIONSHIPS: [&str; 4] = ["friend", "colleague", "family", "acquaintance"];

pub const SOCIAL_NETWORK_FILE: &str = "social_network.csv";
pub const COLLABORATION_NETWORK_FILE: &str = "collaboration_network.json";
pub const RANDOM_NETWORK_FILE: &str = "random_social_network.json";

const SOCIAL_EDGES: [(&str, &str, f64); 9] = [
    ("user1", "user2", 0.8),
    ("user1", "user3", 0.6),
    ("user2", "user4", 0.9),
    ("user3", "user4", 0.7),
    ("user4", "user5", 0.5),
    ("user5", "user6", 0.8),
    ("user1", "user6", 0.4),
    ("user2", "user5", 0.6),
    ("user3", "user6", 0.3),
];

/// Random social network: an Erdős–Rényi G(n, p) graph of people
///
/// Nodes are `person_{i}` with a display name, an age in 18..65 and a city.
/// Each of the n(n-1)/2 pairs is linked with probability `connection_prob`,
/// carrying a weight in [0.1, 1.0) and a relationship label.
pub fn random_social_graph<R: Rng + ?Sized>(
    num_nodes: usize,
    connection_prob: f64,
    rng: &mut R,
) -> Result<Graph> {
    if !(0.0..=1.0).contains(&connection_prob) {
        return Err(GraphError::InvalidArgument(format!(
            "connection probability must be within [0, 1], got {}",
            connection_prob
        )));
    }

    let mut graph = Graph::undirected();
    for i in 0..num_nodes {
        let location = LOCATIONS.choose(rng).copied().unwrap_or("NYC");
        graph.add_node(
            Node::new(format!("person_{}", i))
                .with_name(format!("Person_{}", i))
                .with_attribute("age", rng.gen_range(18i64..65))
                .with_attribute("location", location),
        );
    }

    for i in 0..num_nodes {
        for j in i + 1..num_nodes {
            if !rng.gen_bool(connection_prob) {
                continue;
            }
            let relationship = RELATIONSHIPS.choose(rng).copied().unwrap_or("friend");
            graph.add_edge(
                Edge::new(format!("person_{}", i), format!("person_{}", j))
                    .with_weight(rng.gen_range(0.1..1.0))
                    .with_relationship(relationship),
            )?;
        }
    }

    log::debug!(
        "Generated random social graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn write_social_csv(path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "source,target,weight")?;
    for (source, target, weight) in SOCIAL_EDGES {
        writeln!(writer, "{},{},{}", source, target, weight)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_collaboration_json(path: &Path) -> Result<()> {
    let document = json!({
        "directed": false,
        "nodes": [
            {"id": "researcher1", "department": "CS", "papers": 25},
            {"id": "researcher2", "department": "CS", "papers": 18},
            {"id": "researcher3", "department": "Math", "papers": 30},
            {"id": "researcher4", "department": "Physics", "papers": 22},
            {"id": "researcher5", "department": "CS", "papers": 15}
        ],
        "edges": [
            {"source": "researcher1", "target": "researcher2", "collaborations": 5},
            {"source": "researcher1", "target": "researcher3", "collaborations": 3},
            {"source": "researcher2", "target": "researcher4", "collaborations": 2},
            {"source": "researcher3", "target": "researcher5", "collaborations": 4},
            {"source": "researcher1", "target": "researcher5", "collaborations": 6}
        ]
    });

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&document)?.as_bytes())?;
    Ok(())
}

/// Write the sample datasets into `dir`
///
/// Produces a weighted CSV edge list with a header row, a node-link JSON
/// collaboration network, and a random 20-person social network as JSON.
pub fn write_samples<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let social = dir.join(SOCIAL_NETWORK_FILE);
    write_social_csv(&social)?;

    let collaboration = dir.join(COLLABORATION_NETWORK_FILE);
    write_collaboration_json(&collaboration)?;

    let random = dir.join(RANDOM_NETWORK_FILE);
    export::write_json(&random_social_graph(20, 0.15, rng)?, &random)?;

    log::info!("Sample datasets written to {}", dir.display());
    Ok(vec![social, collaboration, random])
}

//! Shortest paths and bounded-radius neighborhoods

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::algorithms::{bfs, dijkstra, ShortestPathTree};
use crate::graph::compressed::Adjacency;
use crate::graph::{CompressedGraph, Graph};
use crate::metrics::clustering::local_clustering;
use crate::metrics::density;

/// Shortest path query outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathResult {
    /// One source to one target; `length` is infinite when unreachable
    Single {
        source: String,
        target: String,
        path: Option<Vec<String>>,
        length: f64,
        reachable: bool,
    },
    /// One source to every node it reaches, itself included
    AllFrom {
        source: String,
        paths: BTreeMap<String, Vec<String>>,
        lengths: BTreeMap<String, f64>,
        reachable_nodes: usize,
    },
}

/// Local structure around one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodStats {
    pub node_id: String,
    pub radius: usize,
    pub neighbors: Vec<String>,
    pub neighborhood_size: usize,
    /// Distinct neighbors of the node; self-loops and repeated edges are not counted
    pub degree: usize,
    pub local_clustering: f64,
    /// Density of the subgraph induced by the node and its neighbors
    pub local_density: f64,
    pub subgraph_edges: usize,
}

fn lookup(csr: &CompressedGraph, id: &str) -> Result<usize> {
    csr.index_of(id)
        .ok_or_else(|| GraphError::NotFound(format!("Node {} not found in graph", id)))
}

/// Distance tree as float lengths, hop counts when unweighted
fn search(adjacency: &Adjacency, source: usize, weighted: bool) -> ShortestPathTree<f64> {
    if weighted {
        return dijkstra(adjacency, source);
    }
    let tree = bfs(adjacency, source);
    ShortestPathTree {
        source: tree.source,
        distances: tree
            .distances
            .into_iter()
            .map(|d| d.map(|hops| hops as f64))
            .collect(),
        predecessors: tree.predecessors,
    }
}

/// Shortest path from `source` to `target`, or to every reachable node
///
/// Directed graphs follow edge direction. With `weighted` edge weights are
/// distances; otherwise every edge counts as one hop.
pub fn shortest_paths(
    graph: &Graph,
    source: &str,
    target: Option<&str>,
    weighted: bool,
) -> Result<PathResult> {
    let csr = CompressedGraph::from_graph(graph);
    let from = lookup(&csr, source)?;
    let to = target.map(|id| lookup(&csr, id)).transpose()?;

    let tree = search(&csr.outgoing, from, weighted);
    let ids = |path: Vec<usize>| -> Vec<String> {
        path.into_iter().map(|node| csr.id_of(node).to_string()).collect()
    };

    let result = match to {
        Some(to) => {
            let path = tree.path_to(to).map(ids);
            let length = tree.distances[to].unwrap_or(f64::INFINITY);
            if path.is_none() {
                log::debug!("No path from {} to {}", source, csr.id_of(to));
            }
            PathResult::Single {
                source: source.to_string(),
                target: csr.id_of(to).to_string(),
                reachable: path.is_some(),
                path,
                length,
            }
        }
        None => {
            let mut paths = BTreeMap::new();
            let mut lengths = BTreeMap::new();
            for node in 0..csr.node_count {
                if let (Some(distance), Some(path)) = (tree.distances[node], tree.path_to(node)) {
                    let id = csr.id_of(node).to_string();
                    lengths.insert(id.clone(), distance);
                    paths.insert(id, ids(path));
                }
            }
            PathResult::AllFrom {
                source: source.to_string(),
                reachable_nodes: paths.len(),
                paths,
                lengths,
            }
        }
    };

    Ok(result)
}

/// Nodes within `radius` hops of `center`, with local statistics
///
/// Directed graphs expand along outgoing edges.
pub fn neighborhood(graph: &Graph, center: &str, radius: usize) -> Result<NeighborhoodStats> {
    if radius < 1 {
        return Err(GraphError::InvalidArgument(
            "neighborhood radius must be at least 1".to_string(),
        ));
    }
    let csr = CompressedGraph::from_graph(graph);
    let origin = lookup(&csr, center)?;

    let mut visited: HashSet<usize> = HashSet::from([origin]);
    let mut frontier = vec![origin];
    for _ in 0..radius {
        let mut next = Vec::new();
        for &node in &frontier {
            for &dst in csr.outgoing.neighbors(node) {
                if visited.insert(dst as usize) {
                    next.push(dst as usize);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    let mut neighbors: Vec<String> = visited
        .iter()
        .filter(|&&node| node != origin)
        .map(|&node| csr.id_of(node).to_string())
        .collect();
    neighbors.sort();

    let members: HashSet<String> = visited
        .iter()
        .map(|&node| csr.id_of(node).to_string())
        .collect();
    let local = CompressedGraph::from_graph(&graph.subgraph(&members));

    Ok(NeighborhoodStats {
        node_id: center.to_string(),
        radius,
        neighborhood_size: neighbors.len(),
        neighbors,
        degree: csr.degree(origin),
        local_clustering: local_clustering(&csr.undirected, origin),
        local_density: density(&local),
        subgraph_edges: local.simple_edge_count(),
    })
}

//! Community detection over the undirected weighted view

pub mod greedy;
pub mod louvain;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{CompressedGraph, Graph};

/// Disjoint communities covering every node, largest first, members sorted
pub type Partition = Vec<Vec<String>>;

/// Available community detection algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityMethod {
    Louvain,
    GreedyModularity,
}

impl fmt::Display for CommunityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunityMethod::Louvain => f.write_str("louvain"),
            CommunityMethod::GreedyModularity => f.write_str("greedy_modularity"),
        }
    }
}

impl FromStr for CommunityMethod {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "louvain" => Ok(CommunityMethod::Louvain),
            "greedy_modularity" | "greedy" => Ok(CommunityMethod::GreedyModularity),
            other => Err(GraphError::InvalidArgument(format!(
                "unknown community detection method '{}'",
                other
            ))),
        }
    }
}

/// Detected communities and their quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityReport {
    pub method: CommunityMethod,
    pub num_communities: usize,
    pub communities: Partition,
    pub sizes: Vec<usize>,
    pub modularity: f64,
}

/// Symmetric weighted adjacency with separate self-loop weights
///
/// A self-loop of weight `w` adds `2w` to its node's strength.
#[derive(Debug, Clone)]
pub(crate) struct WeightedView {
    pub adjacency: Vec<Vec<(usize, f64)>>,
    pub loops: Vec<f64>,
}

impl WeightedView {
    pub fn from_compressed(graph: &CompressedGraph) -> Self {
        let adjacency = (0..graph.node_count)
            .map(|node| graph.undirected.weighted_neighbors(node).collect())
            .collect();
        Self {
            adjacency,
            loops: vec![0.0; graph.node_count],
        }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn strength(&self, node: usize) -> f64 {
        self.adjacency[node].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.loops[node]
    }

    /// Twice the total edge weight
    pub fn total_strength(&self) -> f64 {
        (0..self.len()).map(|node| self.strength(node)).sum()
    }
}

/// Newman modularity of a node labelling over a weighted view
pub(crate) fn labelled_modularity(view: &WeightedView, labels: &[usize]) -> f64 {
    let m2 = view.total_strength();
    if m2 <= 0.0 {
        return 0.0;
    }

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut totals: HashMap<usize, f64> = HashMap::new();
    for node in 0..view.len() {
        let label = labels[node];
        *totals.entry(label).or_default() += view.strength(node);
        let inside: f64 = view.adjacency[node]
            .iter()
            .filter(|&&(other, _)| labels[other] == label)
            .map(|&(_, w)| w)
            .sum();
        *internal.entry(label).or_default() += inside + 2.0 * view.loops[node];
    }

    totals
        .iter()
        .map(|(label, &total)| {
            let inside = internal.get(label).copied().unwrap_or(0.0);
            inside / m2 - (total / m2).powi(2)
        })
        .sum()
}

/// Group node indices by label into a sorted partition of ids
fn to_partition(graph: &CompressedGraph, labels: &[usize]) -> Partition {
    let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (node, &label) in labels.iter().enumerate() {
        groups
            .entry(label)
            .or_default()
            .push(graph.id_of(node).to_string());
    }

    let mut partition: Partition = groups
        .into_values()
        .map(|mut members| {
            members.sort();
            members
        })
        .collect();
    partition.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    partition
}

/// Modularity of a partition given as id lists
///
/// Every node must appear in exactly one community.
pub fn modularity(graph: &Graph, partition: &[Vec<String>]) -> Result<f64> {
    let csr = CompressedGraph::from_graph(graph);
    let mut labels: Vec<Option<usize>> = vec![None; csr.node_count];

    for (label, community) in partition.iter().enumerate() {
        for id in community {
            let node = csr
                .index_of(id)
                .ok_or_else(|| GraphError::NotFound(format!("Node {} not found in graph", id)))?;
            if labels[node].replace(label).is_some() {
                return Err(GraphError::InvalidArgument(format!(
                    "node {} appears in more than one community",
                    id
                )));
            }
        }
    }

    let labels: Vec<usize> = labels
        .into_iter()
        .enumerate()
        .map(|(node, label)| {
            label.ok_or_else(|| {
                GraphError::InvalidArgument(format!(
                    "node {} is not assigned to a community",
                    csr.id_of(node)
                ))
            })
        })
        .collect::<Result<_>>()?;

    Ok(labelled_modularity(&WeightedView::from_compressed(&csr), &labels))
}

/// Partition a graph into communities with the chosen method
pub fn detect_communities(graph: &Graph, method: CommunityMethod) -> Result<CommunityReport> {
    log::info!(
        "Detecting communities with {} on {} nodes",
        method,
        graph.node_count()
    );

    let csr = CompressedGraph::from_graph(graph);
    let view = WeightedView::from_compressed(&csr);
    let labels = match method {
        CommunityMethod::Louvain => louvain::louvain(&view),
        CommunityMethod::GreedyModularity => greedy::greedy_modularity(&view),
    };

    let modularity = labelled_modularity(&view, &labels);
    let communities = to_partition(&csr, &labels);
    let sizes: Vec<usize> = communities.iter().map(Vec::len).collect();

    log::info!(
        "Found {} communities, modularity {:.4}",
        communities.len(),
        modularity
    );

    Ok(CommunityReport {
        method,
        num_communities: communities.len(),
        communities,
        sizes,
        modularity,
    })
}

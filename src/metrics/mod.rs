//! Whole-graph structural metrics

pub mod centrality;
pub mod clustering;

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::algorithms::{bfs, connected_components, is_strongly_connected};
use crate::graph::{CompressedGraph, Graph};

/// Node id to score
pub type Scores = BTreeMap<String, f64>;

/// The four centrality measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityMeasure {
    Degree,
    Betweenness,
    Closeness,
    Eigenvector,
}

impl CentralityMeasure {
    pub const ALL: [CentralityMeasure; 4] = [
        CentralityMeasure::Degree,
        CentralityMeasure::Betweenness,
        CentralityMeasure::Closeness,
        CentralityMeasure::Eigenvector,
    ];
}

impl fmt::Display for CentralityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CentralityMeasure::Degree => "degree",
            CentralityMeasure::Betweenness => "betweenness",
            CentralityMeasure::Closeness => "closeness",
            CentralityMeasure::Eigenvector => "eigenvector",
        };
        f.write_str(name)
    }
}

/// Snapshot of every structural metric of a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    pub degree_centrality: Scores,
    pub betweenness_centrality: Scores,
    pub closeness_centrality: Scores,
    pub eigenvector_centrality: Scores,
    pub eigenvector_converged: bool,
    /// Global transitivity
    pub clustering_coefficient: f64,
    pub average_clustering: f64,
    /// Only defined for connected graphs
    pub average_shortest_path_length: Option<f64>,
    pub diameter: Option<usize>,
    pub num_connected_components: usize,
    pub largest_component_size: usize,
}

impl GraphMetrics {
    pub fn centrality(&self, measure: CentralityMeasure) -> &Scores {
        match measure {
            CentralityMeasure::Degree => &self.degree_centrality,
            CentralityMeasure::Betweenness => &self.betweenness_centrality,
            CentralityMeasure::Closeness => &self.closeness_centrality,
            CentralityMeasure::Eigenvector => &self.eigenvector_centrality,
        }
    }

    /// Highest scoring nodes for a measure, ties broken by node id
    pub fn top_k(&self, measure: CentralityMeasure, k: usize) -> Vec<(String, f64)> {
        rank(self.centrality(measure), k)
    }

    /// Flat numeric summary of the basic statistics
    pub fn summary(&self) -> BTreeMap<String, f64> {
        let mut summary = BTreeMap::new();
        summary.insert("num_nodes".to_string(), self.num_nodes as f64);
        summary.insert("num_edges".to_string(), self.num_edges as f64);
        summary.insert("density".to_string(), self.density);
        summary.insert(
            "clustering_coefficient".to_string(),
            self.clustering_coefficient,
        );
        summary.insert("average_clustering".to_string(), self.average_clustering);
        summary.insert(
            "num_connected_components".to_string(),
            self.num_connected_components as f64,
        );
        summary.insert(
            "largest_component_size".to_string(),
            self.largest_component_size as f64,
        );
        if let Some(aspl) = self.average_shortest_path_length {
            summary.insert("average_shortest_path_length".to_string(), aspl);
        }
        if let Some(diameter) = self.diameter {
            summary.insert("diameter".to_string(), diameter as f64);
        }
        summary
    }
}

/// Sort scores descending with ties by id and keep the first `k`
pub fn rank(scores: &Scores, k: usize) -> Vec<(String, f64)> {
    scores
        .iter()
        .sorted_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)))
        .take(k)
        .map(|(id, &score)| (id.clone(), score))
        .collect()
}

/// Fail early on graphs above the configured node ceiling
pub fn check_size(graph: &Graph, config: &Config) -> Result<()> {
    match config.max_nodes {
        Some(limit) if graph.node_count() > limit => Err(GraphError::InvalidArgument(format!(
            "graph has {} nodes, above the configured limit of {}",
            graph.node_count(),
            limit
        ))),
        _ => Ok(()),
    }
}

/// Distinct adjacent pairs over possible pairs
pub fn density(graph: &CompressedGraph) -> f64 {
    let n = graph.node_count;
    if n < 2 {
        return 0.0;
    }
    let possible = if graph.directed {
        n * (n - 1)
    } else {
        n * (n - 1) / 2
    };
    graph.simple_edge_count() as f64 / possible as f64
}

/// Average shortest path length and diameter in hops, when the graph is connected
pub fn path_metrics(graph: &CompressedGraph, component_count: usize) -> (Option<f64>, Option<usize>) {
    let n = graph.node_count;
    let connected = if graph.directed {
        is_strongly_connected(graph)
    } else {
        n > 0 && component_count == 1
    };
    if !connected {
        return (None, None);
    }
    if n == 1 {
        return (Some(0.0), Some(0));
    }

    let (total, diameter) = (0..n)
        .into_par_iter()
        .map(|source| {
            bfs(&graph.outgoing, source)
                .distances
                .into_iter()
                .flatten()
                .fold((0usize, 0usize), |(sum, max), d| (sum + d, max.max(d)))
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1.max(b.1)));

    let pairs = (n * (n - 1)) as f64;
    (Some(total as f64 / pairs), Some(diameter))
}

fn to_scores(graph: &CompressedGraph, values: Vec<f64>) -> Scores {
    values
        .into_iter()
        .enumerate()
        .map(|(node, score)| (graph.id_of(node).to_string(), score))
        .collect()
}

/// Compute the full metric snapshot of a graph
pub fn compute_metrics(graph: &Graph, config: &Config) -> Result<GraphMetrics> {
    check_size(graph, config)?;
    log::info!(
        "Computing metrics for {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let csr = CompressedGraph::from_graph(graph);

    let degree = centrality::degree_centrality(&csr);
    let betweenness = centrality::betweenness_centrality(&csr, config.weighted);
    let closeness = centrality::closeness_centrality(&csr, config.weighted);
    let eigenvector = centrality::eigenvector_centrality(
        &csr,
        config.eigenvector_max_iter,
        config.eigenvector_tolerance,
    );
    log::debug!("Centrality measures computed");

    let clustering = clustering::clustering(&csr);
    let components = connected_components(&csr);
    let (average_shortest_path_length, diameter) = path_metrics(&csr, components.len());

    let metrics = GraphMetrics {
        num_nodes: graph.node_count(),
        num_edges: graph.edge_count(),
        density: density(&csr),
        degree_centrality: to_scores(&csr, degree),
        betweenness_centrality: to_scores(&csr, betweenness),
        closeness_centrality: to_scores(&csr, closeness),
        eigenvector_centrality: to_scores(&csr, eigenvector.scores),
        eigenvector_converged: eigenvector.converged,
        clustering_coefficient: clustering.transitivity,
        average_clustering: clustering.average_clustering,
        average_shortest_path_length,
        diameter,
        num_connected_components: components.len(),
        largest_component_size: components.first().map_or(0, Vec::len),
    };

    log::info!(
        "Metrics complete: density {:.4}, {} components",
        metrics.density,
        metrics.num_connected_components
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn graph(edges: &[(&str, &str)], directed: bool) -> Graph {
        let mut graph = Graph::new(directed);
        for &(a, b) in edges {
            graph.add_edge(Edge::new(a, b)).unwrap();
        }
        graph
    }

    #[test]
    fn path_graph_metrics() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "D")], false);
        let metrics = compute_metrics(&g, &Config::default()).unwrap();

        assert_eq!(metrics.num_nodes, 4);
        assert_eq!(metrics.num_edges, 3);
        assert!((metrics.density - 0.5).abs() < 1e-12);
        assert_eq!(metrics.diameter, Some(3));
        assert!((metrics.average_shortest_path_length.unwrap() - 20.0 / 12.0).abs() < 1e-12);
        assert_eq!(metrics.num_connected_components, 1);
        assert!(metrics.eigenvector_converged);
    }

    #[test]
    fn disconnected_graph_has_no_path_metrics() {
        let g = graph(&[("a", "b"), ("c", "d"), ("d", "e")], false);
        let metrics = compute_metrics(&g, &Config::default()).unwrap();

        assert_eq!(metrics.average_shortest_path_length, None);
        assert_eq!(metrics.diameter, None);
        assert_eq!(metrics.num_connected_components, 2);
        assert_eq!(metrics.largest_component_size, 3);
        assert!(!metrics.summary().contains_key("diameter"));
    }

    #[test]
    fn weakly_connected_digraph_has_no_path_metrics() {
        let g = graph(&[("a", "b"), ("b", "c")], true);
        let metrics = compute_metrics(&g, &Config::default()).unwrap();
        assert_eq!(metrics.num_connected_components, 1);
        assert_eq!(metrics.diameter, None);

        let cycle = graph(&[("a", "b"), ("b", "c"), ("c", "a")], true);
        let metrics = compute_metrics(&cycle, &Config::default()).unwrap();
        assert_eq!(metrics.diameter, Some(2));
    }

    #[test]
    fn density_ignores_loops_and_parallel_edges() {
        let g = graph(&[("a", "b"), ("a", "b"), ("b", "b")], false);
        let metrics = compute_metrics(&g, &Config::default()).unwrap();
        assert_eq!(metrics.num_edges, 3);
        assert_eq!(metrics.density, 1.0);
    }

    #[test]
    fn empty_and_single_node_graphs() {
        let empty = compute_metrics(&Graph::undirected(), &Config::default()).unwrap();
        assert_eq!(empty.density, 0.0);
        assert_eq!(empty.diameter, None);
        assert_eq!(empty.largest_component_size, 0);

        let mut single = Graph::undirected();
        single.ensure_node("only");
        let metrics = compute_metrics(&single, &Config::default()).unwrap();
        assert_eq!(metrics.degree_centrality["only"], 1.0);
        assert_eq!(metrics.diameter, Some(0));
    }

    #[test]
    fn top_k_orders_by_score_then_id() {
        let g = graph(&[("hub", "b"), ("hub", "a"), ("hub", "c")], false);
        let metrics = compute_metrics(&g, &Config::default()).unwrap();

        let top = metrics.top_k(CentralityMeasure::Degree, 3);
        let ids: Vec<&str> = top.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["hub", "a", "b"]);
        assert!(metrics.top_k(CentralityMeasure::Betweenness, 0).is_empty());
    }

    #[test]
    fn node_ceiling_is_enforced() {
        let g = graph(&[("a", "b"), ("b", "c")], false);
        let config = Config {
            max_nodes: Some(2),
            ..Config::default()
        };
        assert!(matches!(
            compute_metrics(&g, &config),
            Err(GraphError::InvalidArgument(_))
        ));
    }
}

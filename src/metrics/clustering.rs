//! Triangle based clustering measures on the undirected view

use statrs::statistics::Statistics;

use crate::graph::compressed::Adjacency;
use crate::graph::CompressedGraph;

/// Number of triangles through each node
pub fn triangles(adjacency: &Adjacency, node_count: usize) -> Vec<usize> {
    (0..node_count)
        .map(|node| {
            let neighbors = adjacency.neighbors(node);
            let mut count = 0;
            for (i, &u) in neighbors.iter().enumerate() {
                for &w in &neighbors[i + 1..] {
                    if adjacency.has_edge(u as usize, w) {
                        count += 1;
                    }
                }
            }
            count
        })
        .collect()
}

/// Local clustering coefficient of one node
pub fn local_clustering(adjacency: &Adjacency, node: usize) -> f64 {
    let degree = adjacency.degree(node);
    if degree < 2 {
        return 0.0;
    }
    let neighbors = adjacency.neighbors(node);
    let mut links = 0usize;
    for (i, &u) in neighbors.iter().enumerate() {
        links += neighbors[i + 1..]
            .iter()
            .filter(|&&w| adjacency.has_edge(u as usize, w))
            .count();
    }
    2.0 * links as f64 / (degree * (degree - 1)) as f64
}

/// Transitivity and mean local clustering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringSummary {
    pub transitivity: f64,
    pub average_clustering: f64,
}

pub fn clustering(graph: &CompressedGraph) -> ClusteringSummary {
    let adjacency = &graph.undirected;
    let n = graph.node_count;
    let per_node = triangles(adjacency, n);

    let closed: usize = per_node.iter().sum();
    let triples: usize = (0..n)
        .map(|node| {
            let d = adjacency.degree(node);
            d * d.saturating_sub(1) / 2
        })
        .sum();

    let transitivity = if triples == 0 {
        0.0
    } else {
        closed as f64 / triples as f64
    };

    let local: Vec<f64> = (0..n)
        .map(|node| {
            let d = adjacency.degree(node);
            if d < 2 {
                0.0
            } else {
                2.0 * per_node[node] as f64 / (d * (d - 1)) as f64
            }
        })
        .collect();
    let average_clustering = if local.is_empty() { 0.0 } else { local.mean() };

    ClusteringSummary {
        transitivity,
        average_clustering,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Graph};

    fn csr(edges: &[(&str, &str)]) -> CompressedGraph {
        let mut graph = Graph::undirected();
        for &(a, b) in edges {
            graph.add_edge(Edge::new(a, b)).unwrap();
        }
        CompressedGraph::from_graph(&graph)
    }

    #[test]
    fn triangle_is_fully_clustered() {
        let graph = csr(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let summary = clustering(&graph);
        assert_eq!(summary.transitivity, 1.0);
        assert_eq!(summary.average_clustering, 1.0);
    }

    #[test]
    fn triangle_with_pendant() {
        let graph = csr(&[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        let summary = clustering(&graph);

        // three closed triples out of five centred triples
        assert!((summary.transitivity - 0.6).abs() < 1e-12);
        let c = graph.index_of("c").unwrap();
        assert!((local_clustering(&graph.undirected, c) - 1.0 / 3.0).abs() < 1e-12);
        assert!((summary.average_clustering - (1.0 + 1.0 + 1.0 / 3.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn empty_graph_has_zero_clustering() {
        let graph = CompressedGraph::from_graph(&Graph::undirected());
        assert_eq!(
            clustering(&graph),
            ClusteringSummary {
                transitivity: 0.0,
                average_clustering: 0.0
            }
        );
    }
}

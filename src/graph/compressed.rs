//! Read-only compressed sparse row snapshot of a graph

use std::collections::HashMap;

use crate::graph::builder::AdjacencyBuilder;
use crate::graph::Graph;

/// One CSR adjacency: offsets[i]..offsets[i+1] is the neighbor range of node i
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub offsets: Vec<u32>,
    pub targets: Vec<u32>,
    pub weights: Vec<f64>,
}

impl Adjacency {
    /// Neighbor indices of a node, sorted ascending
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.targets[start..end]
    }

    /// Weights aligned with [`Adjacency::neighbors`]
    pub fn weights(&self, node: usize) -> &[f64] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    /// Neighbor/weight pairs of a node
    pub fn weighted_neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.neighbors(node)
            .iter()
            .zip(self.weights(node))
            .map(|(&dst, &w)| (dst as usize, w))
    }

    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.neighbors(src).binary_search(&dst).is_ok()
    }

    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Total number of stored arcs
    pub fn arc_count(&self) -> usize {
        self.targets.len()
    }
}

/// Snapshot every algorithm runs over
///
/// Self-loops are left out and parallel edges collapse to their lightest
/// weight. For undirected graphs all three adjacencies hold the same arcs.
#[derive(Debug, Clone)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    pub directed: bool,

    /// Original string ids by node index
    pub node_ids: Vec<String>,

    index: HashMap<String, u32>,

    /// Arcs in edge direction
    pub outgoing: Adjacency,

    /// Arcs against edge direction
    pub incoming: Adjacency,

    /// Both directions merged
    pub undirected: Adjacency,
}

impl CompressedGraph {
    pub fn from_graph(graph: &Graph) -> Self {
        let node_ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
        let node_count = node_ids.len();
        let index: HashMap<String, u32> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as u32))
            .collect();

        let mut outgoing = AdjacencyBuilder::with_capacity(node_count);
        let mut incoming = AdjacencyBuilder::with_capacity(node_count);
        let mut undirected = AdjacencyBuilder::with_capacity(node_count);

        for edge in graph.edges() {
            if edge.is_self_loop() {
                continue;
            }
            let (Some(&src), Some(&dst)) = (index.get(&edge.source), index.get(&edge.target)) else {
                continue;
            };

            undirected.add_arc(src, dst, edge.weight);
            undirected.add_arc(dst, src, edge.weight);

            if graph.is_directed() {
                outgoing.add_arc(src, dst, edge.weight);
                incoming.add_arc(dst, src, edge.weight);
            }
        }

        let undirected = undirected.build();
        let (outgoing, incoming) = if graph.is_directed() {
            (outgoing.build(), incoming.build())
        } else {
            (undirected.clone(), undirected.clone())
        };

        Self {
            node_count,
            directed: graph.is_directed(),
            node_ids,
            index,
            outgoing,
            incoming,
            undirected,
        }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&i| i as usize)
    }

    pub fn id_of(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Number of distinct adjacent node pairs, ordered when directed
    pub fn simple_edge_count(&self) -> usize {
        if self.directed {
            self.outgoing.arc_count()
        } else {
            self.undirected.arc_count() / 2
        }
    }

    /// Degree with in and out arcs summed for directed graphs
    pub fn degree(&self, node: usize) -> usize {
        if self.directed {
            self.outgoing.degree(node) + self.incoming.degree(node)
        } else {
            self.undirected.degree(node)
        }
    }
}

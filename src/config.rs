//! Configuration management for the graph analyzer

use serde::{Deserialize, Serialize};

use crate::community::CommunityMethod;

/// Default configuration for the graph analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of nodes reported per centrality ranking
    pub top_k: usize,

    /// Number of top betweenness nodes removed by the robustness simulation
    pub robustness_removals: usize,

    /// Treat edge weights as distances in path based measures
    pub weighted: bool,

    /// Community detection algorithm
    pub community_method: CommunityMethod,

    /// Power iteration cap for eigenvector centrality
    pub eigenvector_max_iter: usize,

    /// Per-node convergence tolerance for eigenvector centrality
    pub eigenvector_tolerance: f64,

    /// Reject graphs with more nodes than this before the quadratic measures
    pub max_nodes: Option<usize>,

    /// Largest graph the binary will run robustness trials on
    pub robustness_node_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_k: 5,
            robustness_removals: 5,
            weighted: false,
            community_method: CommunityMethod::Louvain,
            eigenvector_max_iter: 1000,
            eigenvector_tolerance: 1e-6,
            max_nodes: None,
            robustness_node_limit: 1000,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        top_k: usize,
        robustness_removals: usize,
        weighted: bool,
        community_method: CommunityMethod,
        max_nodes: Option<usize>,
    ) -> Self {
        Self {
            top_k,
            robustness_removals,
            weighted,
            community_method,
            max_nodes,
            ..Self::default()
        }
    }
}

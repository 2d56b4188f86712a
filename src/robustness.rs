//! Node removal simulation against the most central nodes

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::graph::Graph;
use crate::metrics::{compute_metrics, rank, GraphMetrics};

/// Effect of removing a single node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalTrial {
    pub node_removed: String,
    /// Betweenness of the node before removal
    pub original_centrality: f64,
    pub components_before: usize,
    pub largest_component_before: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_after: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_component_after: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemovalTrial {
    /// Whether removing the node split the graph further
    pub fn fragments(&self) -> bool {
        self.components_after
            .map_or(false, |after| after > self.components_before)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub removals_requested: usize,
    pub baseline_components: usize,
    pub baseline_largest_component: usize,
    pub trials: Vec<RemovalTrial>,
    /// Nodes whose removal increased the component count
    pub fragmenting_nodes: Vec<String>,
}

fn run_trial(
    graph: &Graph,
    baseline: &GraphMetrics,
    node: &str,
    centrality: f64,
    config: &Config,
) -> RemovalTrial {
    let mut trial = RemovalTrial {
        node_removed: node.to_string(),
        original_centrality: centrality,
        components_before: baseline.num_connected_components,
        largest_component_before: baseline.largest_component_size,
        components_after: None,
        largest_component_after: None,
        error: None,
    };

    let mut damaged = graph.clone();
    damaged.remove_node(node);
    match compute_metrics(&damaged, config) {
        Ok(after) => {
            trial.components_after = Some(after.num_connected_components);
            trial.largest_component_after = Some(after.largest_component_size);
        }
        Err(err) => {
            log::warn!("Removal trial for {} failed: {}", node, err);
            trial.error = Some(err.to_string());
        }
    }
    trial
}

/// Remove each of the `removals` highest betweenness nodes in turn and measure the damage
///
/// Every trial starts from a fresh copy of the graph; trials run in parallel.
pub fn simulate(graph: &Graph, removals: usize, config: &Config) -> Result<RobustnessReport> {
    let baseline = compute_metrics(graph, config)?;
    let targets = rank(&baseline.betweenness_centrality, removals.min(graph.node_count()));
    log::info!("Simulating removal of {} central nodes", targets.len());

    let trials: Vec<RemovalTrial> = targets
        .par_iter()
        .map(|(node, centrality)| run_trial(graph, &baseline, node, *centrality, config))
        .collect();

    let fragmenting_nodes = trials
        .iter()
        .filter(|trial| trial.fragments())
        .map(|trial| trial.node_removed.clone())
        .collect();

    Ok(RobustnessReport {
        removals_requested: removals,
        baseline_components: baseline.num_connected_components,
        baseline_largest_component: baseline.largest_component_size,
        trials,
        fragmenting_nodes,
    })
}

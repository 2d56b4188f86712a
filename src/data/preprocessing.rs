//! Graph validation and cleanup before analysis

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::algorithms::connected_components;
use crate::graph::{CompressedGraph, Graph};

/// Which cleanup steps to apply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub remove_self_loops: bool,
    pub remove_isolates: bool,
    pub largest_component_only: bool,
}

/// What normalization removed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub options: NormalizeOptions,
    pub self_loops_removed: usize,
    pub isolates_removed: usize,
    /// Nodes dropped for lying outside the largest component
    pub outside_component_removed: usize,
    pub original_nodes: usize,
    pub original_edges: usize,
    pub final_nodes: usize,
    pub final_edges: usize,
}

/// Apply the requested cleanup steps in order: self-loops, isolates, largest component
pub fn normalize(graph: &mut Graph, options: &NormalizeOptions) -> NormalizationReport {
    log::info!("Validating and preprocessing graph");

    let mut report = NormalizationReport {
        options: options.clone(),
        original_nodes: graph.node_count(),
        original_edges: graph.edge_count(),
        ..NormalizationReport::default()
    };

    if options.remove_self_loops {
        report.self_loops_removed = graph.remove_edges_where(|e| e.is_self_loop());
        if report.self_loops_removed > 0 {
            log::info!("Removed {} self loops", report.self_loops_removed);
        }
    }

    if options.remove_isolates {
        report.isolates_removed = remove_isolates(graph);
        if report.isolates_removed > 0 {
            log::info!("Removed {} isolated nodes", report.isolates_removed);
        }
    }

    if options.largest_component_only {
        report.outside_component_removed = keep_largest_component(graph);
    }

    report.final_nodes = graph.node_count();
    report.final_edges = graph.edge_count();

    log::info!(
        "Preprocessing complete: {}->{} nodes, {}->{} edges",
        report.original_nodes,
        report.final_nodes,
        report.original_edges,
        report.final_edges
    );

    report
}

/// Remove nodes that no edge touches
fn remove_isolates(graph: &mut Graph) -> usize {
    let touched: HashSet<&str> = graph
        .edges()
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    let isolates: HashSet<String> = graph
        .node_ids()
        .filter(|id| !touched.contains(id))
        .map(str::to_string)
        .collect();

    if isolates.is_empty() {
        return 0;
    }
    graph.remove_nodes(&isolates)
}

/// Drop every node outside the largest weakly connected component
fn keep_largest_component(graph: &mut Graph) -> usize {
    let csr = CompressedGraph::from_graph(graph);
    let components = connected_components(&csr);
    if components.len() <= 1 {
        return 0;
    }

    let outside: HashSet<String> = components[1..]
        .iter()
        .flatten()
        .map(|&node| csr.id_of(node).to_string())
        .collect();

    log::info!(
        "Keeping largest component: {} nodes of {}",
        components[0].len(),
        csr.node_count
    );
    graph.remove_nodes(&outside)
}

//! Plain text analysis report

use std::io::{self, Write};

use crate::analysis::{AnalysisPayload, AnalysisResult};
use crate::community::CommunityReport;
use crate::data::NormalizationReport;
use crate::metrics::GraphMetrics;
use crate::paths::{NeighborhoodStats, PathResult};
use crate::robustness::RobustnessReport;
use crate::storage::GraphInfo;

const RULE_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 40;

fn section<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w, "{}:", title)?;
    writeln!(w, "{}", "-".repeat(SECTION_WIDTH))
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn write_metrics<W: Write>(w: &mut W, metrics: &GraphMetrics) -> io::Result<()> {
    section(w, "NETWORK METRICS")?;
    writeln!(w, "Nodes: {}", metrics.num_nodes)?;
    writeln!(w, "Edges: {}", metrics.num_edges)?;
    writeln!(w, "Density: {:.6}", metrics.density)?;
    if metrics.num_nodes > 0 {
        let average_degree = 2.0 * metrics.num_edges as f64 / metrics.num_nodes as f64;
        writeln!(w, "Average Degree: {:.2}", average_degree)?;
    }
    writeln!(w, "Clustering Coefficient: {:.4}", metrics.clustering_coefficient)?;
    writeln!(w, "Average Clustering: {:.4}", metrics.average_clustering)?;
    writeln!(w, "Connected Components: {}", metrics.num_connected_components)?;
    writeln!(w, "Largest Component: {} nodes", metrics.largest_component_size)?;
    match (metrics.average_shortest_path_length, metrics.diameter) {
        (Some(aspl), Some(diameter)) => {
            writeln!(w, "Average Shortest Path Length: {:.4}", aspl)?;
            writeln!(w, "Diameter: {}", diameter)?;
        }
        _ => writeln!(w, "Path Length Metrics: undefined (graph is not connected)")?,
    }
    if !metrics.eigenvector_converged {
        writeln!(w, "Eigenvector centrality did not converge; scores reported as zero")?;
    }
    writeln!(w)
}

fn write_communities<W: Write>(w: &mut W, report: &CommunityReport) -> io::Result<()> {
    section(w, "COMMUNITY STRUCTURE")?;
    writeln!(w, "Method: {}", report.method)?;
    writeln!(w, "Number of Communities: {}", report.num_communities)?;
    writeln!(w, "Modularity Score: {:.4}", report.modularity)?;
    let shown: Vec<String> = report.sizes.iter().take(10).map(usize::to_string).collect();
    let more = if report.sizes.len() > 10 { ", ..." } else { "" };
    writeln!(w, "Community Sizes: [{}{}]", shown.join(", "), more)?;
    writeln!(w)
}

fn write_paths<W: Write>(w: &mut W, paths: &PathResult) -> io::Result<()> {
    section(w, "SHORTEST PATHS")?;
    match paths {
        PathResult::Single {
            source,
            target,
            path,
            length,
            ..
        } => match path {
            Some(path) => {
                writeln!(w, "{} to {}: {}", source, target, path.join(" -> "))?;
                writeln!(w, "Length: {}", length)?;
            }
            None => writeln!(w, "{} cannot reach {}", source, target)?,
        },
        PathResult::AllFrom {
            source,
            reachable_nodes,
            lengths,
            ..
        } => {
            writeln!(w, "Source: {}", source)?;
            writeln!(w, "Reachable Nodes: {}", reachable_nodes)?;
            let farthest = lengths
                .iter()
                .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)));
            if let Some((node, distance)) = farthest {
                writeln!(w, "Farthest Node: {} ({})", node, distance)?;
            }
        }
    }
    writeln!(w)
}

fn write_robustness<W: Write>(w: &mut W, report: &RobustnessReport) -> io::Result<()> {
    section(w, "NETWORK ROBUSTNESS")?;
    writeln!(
        w,
        "Original Connectivity: {} components, largest {} nodes",
        report.baseline_components, report.baseline_largest_component
    )?;
    writeln!(w, "Critical Nodes Tested: {}", report.trials.len())?;
    for trial in &report.trials {
        match (trial.components_after, trial.largest_component_after) {
            (Some(components), Some(largest)) => writeln!(
                w,
                "  - {} (betweenness {:.4}): components {} -> {}, largest {} -> {}",
                trial.node_removed,
                trial.original_centrality,
                trial.components_before,
                components,
                trial.largest_component_before,
                largest
            )?,
            _ => writeln!(
                w,
                "  - {}: failed ({})",
                trial.node_removed,
                trial.error.as_deref().unwrap_or("unknown error")
            )?,
        }
    }
    if !report.fragmenting_nodes.is_empty() {
        writeln!(w, "Fragmenting Nodes: {}", report.fragmenting_nodes.join(", "))?;
    }
    writeln!(w)
}

fn write_neighborhood<W: Write>(w: &mut W, stats: &NeighborhoodStats) -> io::Result<()> {
    section(w, "NEIGHBORHOOD")?;
    writeln!(w, "Node: {} (radius {})", stats.node_id, stats.radius)?;
    writeln!(w, "Neighborhood Size: {}", stats.neighborhood_size)?;
    writeln!(w, "Degree: {}", stats.degree)?;
    writeln!(w, "Local Clustering: {:.4}", stats.local_clustering)?;
    writeln!(w, "Local Density: {:.4}", stats.local_density)?;
    writeln!(w, "Subgraph Edges: {}", stats.subgraph_edges)?;
    writeln!(w)
}

/// Write the full report for one run
pub fn write_report<W: Write>(
    w: &mut W,
    info: &GraphInfo,
    preprocessing: &NormalizationReport,
    results: &[AnalysisResult],
) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(w, "{}", rule)?;
    writeln!(w, "RELATIONSHIP GRAPH ANALYSIS REPORT")?;
    writeln!(w, "{}", rule)?;
    writeln!(w)?;

    section(w, "DATASET INFORMATION")?;
    writeln!(w, "Source: {}", info.source)?;
    writeln!(w, "Format: {}", info.format)?;
    writeln!(
        w,
        "Type: {}",
        if info.directed { "Directed" } else { "Undirected" }
    )?;
    writeln!(w)?;

    section(w, "PREPROCESSING")?;
    writeln!(
        w,
        "Original: {} nodes, {} edges",
        preprocessing.original_nodes, preprocessing.original_edges
    )?;
    writeln!(
        w,
        "Final: {} nodes, {} edges",
        preprocessing.final_nodes, preprocessing.final_edges
    )?;
    writeln!(w, "Self loops removed: {}", preprocessing.self_loops_removed)?;
    writeln!(w, "Isolates removed: {}", preprocessing.isolates_removed)?;
    writeln!(
        w,
        "Outside largest component: {}",
        preprocessing.outside_component_removed
    )?;
    writeln!(w)?;

    for result in results {
        match &result.result {
            AnalysisPayload::Metrics(metrics) => write_metrics(w, metrics)?,
            AnalysisPayload::Centrality(leaders) => {
                section(w, "MOST INFLUENTIAL NODES")?;
                for (measure, nodes) in leaders {
                    if nodes.is_empty() {
                        continue;
                    }
                    writeln!(w, "{}:", title_case(measure))?;
                    for (node, score) in nodes {
                        writeln!(w, "  - {}: {:.4}", node, score)?;
                    }
                }
                writeln!(w)?;
            }
            AnalysisPayload::Communities(report) => write_communities(w, report)?,
            AnalysisPayload::Paths(paths) => write_paths(w, paths)?,
            AnalysisPayload::Robustness(report) => write_robustness(w, report)?,
            AnalysisPayload::Neighborhood(stats) => write_neighborhood(w, stats)?,
        }
    }

    writeln!(w, "{}", rule)?;
    writeln!(w, "End of Report")?;
    writeln!(w, "{}", rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{run, AnalysisRequest};
    use crate::config::Config;
    use crate::graph::{Edge, Graph};

    #[test]
    fn report_has_a_section_per_analysis() {
        let mut graph = Graph::undirected();
        graph.add_edge(Edge::new("a", "b")).unwrap();
        graph.add_edge(Edge::new("b", "c")).unwrap();
        let config = Config::default();

        let results: Vec<AnalysisResult> = [
            AnalysisRequest::BasicMetrics,
            AnalysisRequest::Centrality { top_k: Some(2) },
            AnalysisRequest::PathAnalysis {
                source: Some("a".into()),
                target: Some("c".into()),
            },
        ]
        .iter()
        .map(|request| run(&graph, request, &config).unwrap())
        .collect();

        let info = GraphInfo {
            source: "memory".into(),
            format: "csv".into(),
            directed: false,
            num_nodes: 3,
            num_edges: 2,
        };
        let mut buffer = Vec::new();
        write_report(&mut buffer, &info, &NormalizationReport::default(), &results).unwrap();
        let report = String::from_utf8(buffer).unwrap();

        assert!(report.contains("NETWORK METRICS:"));
        assert!(report.contains("Diameter: 2"));
        assert!(report.contains("Betweenness:\n  - b: 1.0000"));
        assert!(report.contains("a to c: a -> b -> c"));
        assert!(report.trim_end().ends_with(&"=".repeat(RULE_WIDTH)));
    }

    #[test]
    fn measure_names_are_title_cased() {
        assert_eq!(title_case("degree"), "Degree");
        assert_eq!(title_case("basic_metrics"), "Basic Metrics");
    }
}

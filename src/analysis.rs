//! Dispatch of analysis requests to the engines

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::community::{detect_communities, CommunityMethod, CommunityReport};
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::metrics::{compute_metrics, CentralityMeasure, GraphMetrics};
use crate::paths::{neighborhood, shortest_paths, NeighborhoodStats, PathResult};
use crate::robustness::{simulate, RobustnessReport};

/// Names of the available analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    BasicMetrics,
    Centrality,
    CommunityDetection,
    PathAnalysis,
    Robustness,
    Neighborhood,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::BasicMetrics => "basic_metrics",
            Operation::Centrality => "centrality",
            Operation::CommunityDetection => "community_detection",
            Operation::PathAnalysis => "path_analysis",
            Operation::Robustness => "robustness",
            Operation::Neighborhood => "neighborhood",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic_metrics" | "metrics" => Ok(Operation::BasicMetrics),
            "centrality" => Ok(Operation::Centrality),
            "community_detection" | "communities" => Ok(Operation::CommunityDetection),
            "path_analysis" | "paths" => Ok(Operation::PathAnalysis),
            "robustness" => Ok(Operation::Robustness),
            "neighborhood" => Ok(Operation::Neighborhood),
            other => Err(GraphError::InvalidArgument(format!(
                "unknown analysis '{}'",
                other
            ))),
        }
    }
}

fn default_radius() -> usize {
    1
}

/// One analysis to run; unset parameters fall back to the [`Config`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum AnalysisRequest {
    BasicMetrics,
    Centrality {
        #[serde(default)]
        top_k: Option<usize>,
    },
    CommunityDetection {
        #[serde(default)]
        method: Option<CommunityMethod>,
    },
    /// Without a source the first node of the graph is used
    PathAnalysis {
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
    Robustness {
        #[serde(default)]
        removals: Option<usize>,
    },
    /// Without a node the first node of the graph is used
    Neighborhood {
        #[serde(default)]
        node: Option<String>,
        #[serde(default = "default_radius")]
        radius: usize,
    },
}

impl AnalysisRequest {
    pub fn operation(&self) -> Operation {
        match self {
            AnalysisRequest::BasicMetrics => Operation::BasicMetrics,
            AnalysisRequest::Centrality { .. } => Operation::Centrality,
            AnalysisRequest::CommunityDetection { .. } => Operation::CommunityDetection,
            AnalysisRequest::PathAnalysis { .. } => Operation::PathAnalysis,
            AnalysisRequest::Robustness { .. } => Operation::Robustness,
            AnalysisRequest::Neighborhood { .. } => Operation::Neighborhood,
        }
    }
}

/// Top ranked `(node id, score)` pairs per centrality measure
pub type CentralityLeaders = BTreeMap<String, Vec<(String, f64)>>;

/// Engine output carried by an [`AnalysisResult`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Metrics(Box<GraphMetrics>),
    Centrality(CentralityLeaders),
    Communities(CommunityReport),
    Paths(PathResult),
    Robustness(RobustnessReport),
    Neighborhood(NeighborhoodStats),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub operation: Operation,
    pub result: AnalysisPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, f64>>,
    pub description: String,
}

/// Leaders of every centrality measure
pub fn centrality_leaders(metrics: &GraphMetrics, top_k: usize) -> CentralityLeaders {
    CentralityMeasure::ALL
        .iter()
        .map(|&measure| (measure.to_string(), metrics.top_k(measure, top_k)))
        .collect()
}

fn first_node(graph: &Graph, role: &str) -> Result<String> {
    graph.node_ids().next().map(str::to_string).ok_or_else(|| {
        GraphError::InvalidArgument(format!("graph is empty, no {} node to analyze", role))
    })
}

/// Run one analysis over a graph
pub fn run(graph: &Graph, request: &AnalysisRequest, config: &Config) -> Result<AnalysisResult> {
    let operation = request.operation();
    log::info!("Running {} analysis", operation);

    let result = match request {
        AnalysisRequest::BasicMetrics => {
            let metrics = compute_metrics(graph, config)?;
            AnalysisResult {
                operation,
                metrics: Some(metrics.summary()),
                result: AnalysisPayload::Metrics(Box::new(metrics)),
                description: "Comprehensive network metrics analysis".to_string(),
            }
        }
        AnalysisRequest::Centrality { top_k } => {
            let top_k = top_k.unwrap_or(config.top_k);
            let metrics = compute_metrics(graph, config)?;
            AnalysisResult {
                operation,
                metrics: Some(metrics.summary()),
                result: AnalysisPayload::Centrality(centrality_leaders(&metrics, top_k)),
                description: format!(
                    "Top {} influential nodes by different centrality measures",
                    top_k
                ),
            }
        }
        AnalysisRequest::CommunityDetection { method } => {
            let method = method.unwrap_or(config.community_method);
            let report = detect_communities(graph, method)?;
            let mut summary = BTreeMap::new();
            summary.insert("num_communities".to_string(), report.num_communities as f64);
            summary.insert("modularity".to_string(), report.modularity);
            AnalysisResult {
                operation,
                metrics: Some(summary),
                result: AnalysisPayload::Communities(report),
                description: format!("Community detection using {} method", method),
            }
        }
        AnalysisRequest::PathAnalysis { source, target } => {
            let source = match source {
                Some(source) => source.clone(),
                None => first_node(graph, "source")?,
            };
            let paths = shortest_paths(graph, &source, target.as_deref(), config.weighted)?;
            AnalysisResult {
                operation,
                metrics: None,
                result: AnalysisPayload::Paths(paths),
                description: format!("Shortest path analysis from {}", source),
            }
        }
        AnalysisRequest::Robustness { removals } => {
            let removals = removals.unwrap_or(config.robustness_removals);
            let report = simulate(graph, removals, config)?;
            AnalysisResult {
                operation,
                metrics: None,
                result: AnalysisPayload::Robustness(report),
                description: format!(
                    "Network robustness analysis with {} node removals",
                    removals
                ),
            }
        }
        AnalysisRequest::Neighborhood { node, radius } => {
            let node = match node {
                Some(node) => node.clone(),
                None => first_node(graph, "center")?,
            };
            let stats = neighborhood(graph, &node, *radius)?;
            AnalysisResult {
                operation,
                metrics: None,
                result: AnalysisPayload::Neighborhood(stats),
                description: format!(
                    "Neighborhood analysis for node {} with radius {}",
                    node, radius
                ),
            }
        }
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn triangle() -> Graph {
        let mut graph = Graph::undirected();
        for (a, b) in [("x", "y"), ("y", "z"), ("z", "x")] {
            graph.add_edge(Edge::new(a, b)).unwrap();
        }
        graph
    }

    #[test]
    fn requests_deserialize_from_tagged_json() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"operation": "neighborhood", "node": "x"}"#).unwrap();
        assert_eq!(
            request,
            AnalysisRequest::Neighborhood {
                node: Some("x".to_string()),
                radius: 1
            }
        );

        let request: AnalysisRequest = serde_json::from_str(
            r#"{"operation": "community_detection", "method": "greedy_modularity"}"#,
        )
        .unwrap();
        assert_eq!(request.operation(), Operation::CommunityDetection);
    }

    #[test]
    fn basic_metrics_carries_summary() {
        let result = run(&triangle(), &AnalysisRequest::BasicMetrics, &Config::default()).unwrap();
        assert_eq!(result.operation, Operation::BasicMetrics);
        let summary = result.metrics.unwrap();
        assert_eq!(summary["num_nodes"], 3.0);
        assert_eq!(summary["density"], 1.0);
    }

    #[test]
    fn centrality_with_zero_top_k_is_empty() {
        let request = AnalysisRequest::Centrality { top_k: Some(0) };
        let result = run(&triangle(), &request, &Config::default()).unwrap();
        match result.result {
            AnalysisPayload::Centrality(leaders) => {
                assert_eq!(leaders.len(), 4);
                assert!(leaders.values().all(Vec::is_empty));
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn path_analysis_defaults_to_first_node() {
        let request = AnalysisRequest::PathAnalysis {
            source: None,
            target: None,
        };
        let result = run(&triangle(), &request, &Config::default()).unwrap();
        assert_eq!(result.description, "Shortest path analysis from x");
    }

    #[test]
    fn empty_graph_has_no_default_node() {
        let request = AnalysisRequest::Neighborhood {
            node: None,
            radius: 1,
        };
        assert!(matches!(
            run(&Graph::undirected(), &request, &Config::default()),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn operation_names_round_trip() {
        for op in [
            Operation::BasicMetrics,
            Operation::Centrality,
            Operation::CommunityDetection,
            Operation::PathAnalysis,
            Operation::Robustness,
            Operation::Neighborhood,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("sentiment".parse::<Operation>().is_err());
    }
}

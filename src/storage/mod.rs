//! Results persistence module

pub mod export;
pub mod report;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, to_string_pretty};

use crate::analysis::AnalysisResult;
use crate::data::NormalizationReport;
use crate::error::Result;
use crate::graph::Graph;

pub const RESULTS_FILE: &str = "analysis_results.json";
pub const REPORT_FILE: &str = "analysis_report.txt";
pub const GRAPH_FILE: &str = "processed_graph.graphml";

/// Where the analyzed graph came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphInfo {
    pub source: String,
    pub format: String,
    pub directed: bool,
    pub num_nodes: usize,
    pub num_edges: usize,
}

impl GraphInfo {
    pub fn new(source: impl Into<String>, format: impl Into<String>, graph: &Graph) -> Self {
        Self {
            source: source.into(),
            format: format.into(),
            directed: graph.is_directed(),
            num_nodes: graph.node_count(),
            num_edges: graph.edge_count(),
        }
    }
}

/// Files written by [`save_results`]
#[derive(Debug, Clone)]
pub struct SavedFiles {
    pub results: PathBuf,
    pub report: PathBuf,
    pub graph: Option<PathBuf>,
}

/// Save analysis results to the specified directory
///
/// Writes the JSON results and the text report, plus the processed graph as
/// GraphML when `graph` is given.
pub fn save_results(
    output_dir: &Path,
    info: &GraphInfo,
    preprocessing: &NormalizationReport,
    results: &[AnalysisResult],
    graph: Option<&Graph>,
) -> Result<SavedFiles> {
    log::info!(
        "Saving {} analysis results to {}",
        results.len(),
        output_dir.display()
    );

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    let results_path = output_dir.join(RESULTS_FILE);
    save_json(&results_path, info, preprocessing, results)?;

    let report_path = output_dir.join(REPORT_FILE);
    let mut file = File::create(&report_path)?;
    report::write_report(&mut file, info, preprocessing, results)?;

    let graph_path = match graph {
        Some(graph) => {
            let path = output_dir.join(GRAPH_FILE);
            export::write_graphml(graph, &path)?;
            Some(path)
        }
        None => None,
    };

    log::info!("Results saved successfully");

    Ok(SavedFiles {
        results: results_path,
        report: report_path,
        graph: graph_path,
    })
}

fn save_json(
    path: &Path,
    info: &GraphInfo,
    preprocessing: &NormalizationReport,
    results: &[AnalysisResult],
) -> Result<()> {
    let document = json!({
        "graph_info": info,
        "preprocessing": preprocessing,
        "analysis_results": results,
    });

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&document)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{run, AnalysisRequest};
    use crate::config::Config;
    use crate::graph::Edge;
    use serde_json::Value;

    #[test]
    fn writes_results_report_and_graph() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = Graph::undirected();
        graph.add_edge(Edge::new("a", "b")).unwrap();
        graph.ensure_node("c");

        let request = AnalysisRequest::PathAnalysis {
            source: Some("a".into()),
            target: Some("c".into()),
        };
        let results = vec![run(&graph, &request, &Config::default()).unwrap()];
        let info = GraphInfo::new("inline", "json", &graph);

        let saved = save_results(
            dir.path(),
            &info,
            &NormalizationReport::default(),
            &results,
            Some(&graph),
        )
        .unwrap();

        let text = fs::read_to_string(&saved.results).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let first = &value["analysis_results"][0];
        assert_eq!(first["operation"], "path_analysis");
        assert_eq!(first["result"]["reachable"], false);
        assert!(first["result"]["length"].is_null());
        assert_eq!(value["graph_info"]["num_nodes"], 3);

        assert!(saved.report.exists());
        assert!(saved.graph.unwrap().exists());
    }
}

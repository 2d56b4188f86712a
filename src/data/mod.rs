//! Graph ingestion from edge lists, JSON, adjacency matrices, GraphML and Parquet

pub mod detect;
pub mod graphml;
pub mod json;
pub mod parquet;
pub mod preprocessing;
pub mod sample;
pub mod tabular;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::Graph;

pub use preprocessing::{normalize, NormalizationReport, NormalizeOptions};

/// Source encoding of a graph file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Auto,
    Csv,
    Json,
    GraphMl,
    Adjacency,
    Parquet,
}

impl FromStr for InputFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "csv" | "edgelist" | "edge_list" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            "graphml" => Ok(InputFormat::GraphMl),
            "adjacency" => Ok(InputFormat::Adjacency),
            "parquet" => Ok(InputFormat::Parquet),
            other => Err(GraphError::UnsupportedFormat(format!(
                "unknown format hint '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Auto => "auto",
            InputFormat::Csv => "CSV edge list",
            InputFormat::Json => "JSON",
            InputFormat::GraphMl => "GraphML",
            InputFormat::Adjacency => "adjacency matrix",
            InputFormat::Parquet => "Parquet edge list",
        };
        f.write_str(name)
    }
}

/// Options for reading a graph file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Encoding hint; `Auto` inspects the file
    pub format: InputFormat,

    /// Build a directed graph from edge lists
    pub directed: bool,

    /// Column index of the source node
    pub source_col: usize,

    /// Column index of the target node
    pub target_col: usize,

    /// Column index of the edge weight, if any
    pub weight_col: Option<usize>,

    /// Field separator; chosen from the extension when unset
    pub delimiter: Option<u8>,

    /// Treat the first edge list row as a header
    pub has_header: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            format: InputFormat::Auto,
            directed: false,
            source_col: 0,
            target_col: 1,
            weight_col: None,
            delimiter: None,
            has_header: false,
        }
    }
}

/// Resolve the format a file will be read as, sampling it when the hint is `Auto`
pub fn resolve_format(path: &Path, options: &IngestOptions) -> Result<InputFormat> {
    if !path.exists() {
        return Err(GraphError::NotFound(format!(
            "File not found: {}",
            path.display()
        )));
    }

    match options.format {
        InputFormat::Auto => detect::detect_format(path, options.delimiter),
        explicit => Ok(explicit),
    }
}

/// Load a graph file according to `options`
pub fn load_graph(path: impl AsRef<Path>, options: &IngestOptions) -> Result<Graph> {
    let path = path.as_ref();
    let format = resolve_format(path, options)?;
    log::info!("Loading {} from {}", format, path.display());

    let graph = match format {
        InputFormat::Csv => tabular::load_edge_list(path, options)?,
        InputFormat::Adjacency => {
            let delimiter = options
                .delimiter
                .unwrap_or_else(|| detect::default_delimiter(path));
            tabular::load_adjacency_matrix(path, delimiter)?
        }
        InputFormat::Json => json::load_json(path)?,
        InputFormat::GraphMl => graphml::load_graphml(path)?,
        InputFormat::Parquet => parquet::load_edge_list(path, options)?,
        InputFormat::Auto => {
            return Err(GraphError::UnsupportedFormat(format!(
                "could not determine the format of {}",
                path.display()
            )))
        }
    };

    log::info!(
        "Graph loaded: {} nodes, {} edges ({})",
        graph.node_count(),
        graph.edge_count(),
        if graph.is_directed() { "directed" } else { "undirected" }
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_hints() {
        assert_eq!("auto".parse::<InputFormat>().unwrap(), InputFormat::Auto);
        assert_eq!("CSV".parse::<InputFormat>().unwrap(), InputFormat::Csv);
        assert_eq!("graphml".parse::<InputFormat>().unwrap(), InputFormat::GraphMl);
        assert_eq!("adjacency".parse::<InputFormat>().unwrap(), InputFormat::Adjacency);
        assert!(matches!(
            "pickle".parse::<InputFormat>(),
            Err(GraphError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = load_graph("/definitely/not/here.csv", &IngestOptions::default());
        assert!(matches!(result, Err(GraphError::NotFound(_))));
    }

    #[test]
    fn missing_file_wins_over_unknown_extension() {
        let path = Path::new("/definitely/not/graph.xyz");
        assert!(matches!(
            resolve_format(path, &IngestOptions::default()),
            Err(GraphError::NotFound(_))
        ));
        assert!(matches!(
            load_graph(path, &IngestOptions::default()),
            Err(GraphError::NotFound(_))
        ));
    }
}

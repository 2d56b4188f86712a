//! Core library functions for the relationship graph analyzer

pub mod analysis;
pub mod community;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod paths;
pub mod robustness;
pub mod storage;

pub use analysis::{run, AnalysisPayload, AnalysisRequest, AnalysisResult, Operation};
pub use community::{detect_communities, modularity, CommunityMethod, CommunityReport, Partition};
pub use config::Config;
pub use data::{load_graph, normalize, IngestOptions, InputFormat, NormalizationReport, NormalizeOptions};
pub use error::{GraphError, Result};
pub use graph::{AttrValue, Edge, Graph, Node};
pub use metrics::{compute_metrics, CentralityMeasure, GraphMetrics};
pub use paths::{neighborhood, shortest_paths, NeighborhoodStats, PathResult};
pub use robustness::{simulate, RobustnessReport};

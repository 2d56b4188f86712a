use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use graph_insight_analyzer::analysis::{self, AnalysisRequest, Operation};
use graph_insight_analyzer::community::CommunityMethod;
use graph_insight_analyzer::config::Config;
use graph_insight_analyzer::data::{self, IngestOptions, InputFormat, NormalizeOptions};
use graph_insight_analyzer::storage::{self, GraphInfo};

/// Graphs above this size are not exported alongside the results
const EXPORT_NODE_LIMIT: usize = 10_000;

#[derive(Parser, Debug)]
#[clap(
    name = "graph-insight-analyzer",
    about = "Structural analytics for relationship graphs"
)]
struct Cli {
    /// Path to the input graph file
    #[clap(long, required_unless_present = "create_samples")]
    input: Option<PathBuf>,

    /// Write sample datasets into this directory and exit
    #[clap(long)]
    create_samples: Option<PathBuf>,

    /// Input format: auto, csv, json, graphml, adjacency or parquet
    #[clap(long, default_value = "auto")]
    format: InputFormat,

    /// Treat edge lists as directed
    #[clap(long)]
    directed: bool,

    /// Source column index for edge lists
    #[clap(long, default_value = "0")]
    source_col: usize,

    /// Target column index for edge lists
    #[clap(long, default_value = "1")]
    target_col: usize,

    /// Weight column index for edge lists
    #[clap(long)]
    weight_col: Option<usize>,

    /// Field delimiter for tabular files (a single character or "tab")
    #[clap(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// First edge list row is a header
    #[clap(long)]
    header: bool,

    /// Remove self loops before analysis
    #[clap(long)]
    remove_self_loops: bool,

    /// Remove isolated nodes before analysis
    #[clap(long)]
    remove_isolates: bool,

    /// Keep only the largest connected component
    #[clap(long)]
    largest_component: bool,

    /// Output directory for results
    #[clap(long, default_value = "analysis_output")]
    output_dir: PathBuf,

    /// Comma separated analyses to run
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "basic_metrics,centrality,community_detection,robustness"
    )]
    analysis: Vec<Operation>,

    /// Source node for path analysis (defaults to the first node)
    #[clap(long)]
    source: Option<String>,

    /// Target node for path analysis; all targets when omitted
    #[clap(long)]
    target: Option<String>,

    /// Center node for neighborhood analysis (defaults to the first node)
    #[clap(long)]
    node: Option<String>,

    /// Neighborhood radius in hops
    #[clap(long, default_value = "1")]
    radius: usize,

    /// Nodes reported per centrality measure
    #[clap(long, default_value = "5")]
    top_k: usize,

    /// Central nodes removed by the robustness simulation
    #[clap(long, default_value = "5")]
    removals: usize,

    /// Community detection method: louvain or greedy_modularity
    #[clap(long, default_value = "louvain")]
    method: CommunityMethod,

    /// Use edge weights as distances in path based measures
    #[clap(long)]
    weighted: bool,

    /// Refuse graphs with more nodes than this
    #[clap(long)]
    max_nodes: Option<usize>,

    /// Skip robustness simulation on graphs with more nodes than this
    #[clap(long, default_value = "1000")]
    robustness_node_limit: usize,

    /// Also write the processed graph as GraphML
    #[clap(long)]
    export_graph: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if raw.len() == 1 => Ok(raw.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single character, got '{}'", raw)),
    }
}

fn build_requests(args: &Cli, config: &Config, node_count: usize) -> Vec<AnalysisRequest> {
    let mut requests = Vec::new();
    for &operation in &args.analysis {
        let request = match operation {
            Operation::BasicMetrics => AnalysisRequest::BasicMetrics,
            Operation::Centrality => AnalysisRequest::Centrality {
                top_k: Some(config.top_k),
            },
            Operation::CommunityDetection => AnalysisRequest::CommunityDetection {
                method: Some(config.community_method),
            },
            Operation::PathAnalysis => AnalysisRequest::PathAnalysis {
                source: args.source.clone(),
                target: args.target.clone(),
            },
            Operation::Robustness => {
                if node_count > config.robustness_node_limit {
                    log::warn!(
                        "Skipping robustness analysis: {} nodes exceeds the limit of {}",
                        node_count,
                        config.robustness_node_limit
                    );
                    continue;
                }
                AnalysisRequest::Robustness {
                    removals: Some(config.robustness_removals),
                }
            }
            Operation::Neighborhood => AnalysisRequest::Neighborhood {
                node: args.node.clone(),
                radius: args.radius,
            },
        };
        if !requests.contains(&request) {
            requests.push(request);
        }
    }
    requests
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        // If threads = 0, use all available cores
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    if let Some(dir) = &args.create_samples {
        let files = data::sample::write_samples(dir, &mut rand::thread_rng())
            .with_context(|| format!("failed to write samples to {}", dir.display()))?;
        for file in &files {
            log::info!("Sample: {}", file.display());
        }
        return Ok(());
    }

    let input = args.input.clone().context("--input is required")?;

    log::info!("Starting graph analysis");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", args.output_dir.display());

    let mut config = Config::new(
        args.top_k,
        args.removals,
        args.weighted,
        args.method,
        args.max_nodes,
    );
    config.robustness_node_limit = args.robustness_node_limit;

    // 1. Load data
    let mut ingest = IngestOptions {
        format: args.format,
        directed: args.directed,
        source_col: args.source_col,
        target_col: args.target_col,
        weight_col: args.weight_col,
        delimiter: args.delimiter,
        has_header: args.header,
    };
    ingest.format = data::resolve_format(&input, &ingest)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut graph = data::load_graph(&input, &ingest)
        .with_context(|| format!("failed to load {}", input.display()))?;

    // 2. Normalize
    let normalize_options = NormalizeOptions {
        remove_self_loops: args.remove_self_loops,
        remove_isolates: args.remove_isolates,
        largest_component_only: args.largest_component,
    };
    let preprocessing = data::normalize(&mut graph, &normalize_options);

    // 3. Run every requested analysis before writing anything
    let requests = build_requests(&args, &config, graph.node_count());
    let mut results = Vec::with_capacity(requests.len());
    for request in &requests {
        let result = analysis::run(&graph, request, &config)
            .with_context(|| format!("{} analysis failed", request.operation()))?;
        results.push(result);
    }

    // 4. Save results
    let export = if args.export_graph && graph.node_count() > EXPORT_NODE_LIMIT {
        log::warn!(
            "Not exporting graph: {} nodes exceeds {}",
            graph.node_count(),
            EXPORT_NODE_LIMIT
        );
        None
    } else if args.export_graph {
        Some(&graph)
    } else {
        None
    };

    let info = GraphInfo::new(input.display().to_string(), ingest.format.to_string(), &graph);
    let saved = storage::save_results(&args.output_dir, &info, &preprocessing, &results, export)
        .context("failed to save results")?;

    log::info!("JSON results: {}", saved.results.display());
    log::info!("Report: {}", saved.report.display());
    if let Some(path) = &saved.graph {
        log::info!("Graph: {}", path.display());
    }
    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}

//! Parquet file handling for edge list data

use std::path::Path;

use polars::prelude::*;

use crate::data::tabular::edges_from_frame;
use crate::data::IngestOptions;
use crate::error::Result;
use crate::graph::Graph;

/// Load an edge list stored as a Parquet table
///
/// Columns are addressed by position, like the text edge list. Parquet
/// carries its own schema, so no header row is ever skipped.
pub fn load_edge_list(path: &Path, options: &IngestOptions) -> Result<Graph> {
    log::info!("Reading parquet file: {}", path.display());

    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;

    log::debug!("File schema: {:?}", df.schema());
    log::info!("Loaded {} relationship rows", df.height());

    edges_from_frame(&df, options, false)
}

//! Delimited text handling: edge lists and adjacency matrices

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use polars::prelude::*;

use crate::data::detect::default_delimiter;
use crate::data::IngestOptions;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, Node};

/// Read a delimited file into an all-string frame, skipping `#` comment lines
///
/// `n_rows` caps the rows read. With `strict` set, rows longer than the first
/// one are an error instead of being truncated. Returns `None` when the file
/// holds no data rows.
pub(crate) fn read_table(
    path: &Path,
    delimiter: u8,
    n_rows: Option<usize>,
    strict: bool,
) -> Result<Option<DataFrame>> {
    let reader = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .with_n_rows(n_rows)
        .map_parse_options(|opts| {
            opts.with_separator(delimiter)
                .with_comment_prefix(Some("#"))
                .with_truncate_ragged_lines(!strict)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?;

    match reader.finish() {
        Ok(df) if df.height() == 0 || df.width() == 0 => Ok(None),
        Ok(df) => Ok(Some(df)),
        Err(PolarsError::NoData(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Column `idx` of a frame as optional trimmed strings
pub(crate) fn column_strings(df: &DataFrame, idx: usize) -> Result<Vec<Option<String>>> {
    let column = df.get_columns()[idx].cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect())
}

fn parse_weight(raw: &str, row: usize) -> Result<f64> {
    let weight: f64 = raw.parse().map_err(|_| {
        GraphError::MalformedInput(format!("row {}: weight '{}' is not a number", row + 1, raw))
    })?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(GraphError::MalformedInput(format!(
            "row {}: weight {} must be finite and non-negative",
            row + 1,
            weight
        )));
    }
    Ok(weight)
}

/// Build a graph from the source/target/weight columns of a frame
///
/// `allow_header` enables skipping the first row, either because the caller
/// asked for it or because its weight cell is not numeric.
pub(crate) fn edges_from_frame(
    df: &DataFrame,
    options: &IngestOptions,
    allow_header: bool,
) -> Result<Graph> {
    let width = df.width();
    let required = options.source_col.max(options.target_col);
    if required >= width {
        return Err(GraphError::MalformedInput(format!(
            "Required column index {} not found. Available columns: {}",
            required, width
        )));
    }

    let sources = column_strings(df, options.source_col)?;
    let targets = column_strings(df, options.target_col)?;
    let weights = match options.weight_col {
        Some(col) if col < width => Some(column_strings(df, col)?),
        Some(col) => {
            log::warn!(
                "Weight column {} not found ({} columns), using unit weights",
                col,
                width
            );
            None
        }
        None => None,
    };

    let mut skip_first = allow_header && options.has_header;
    if allow_header && !skip_first {
        if let Some(first) = weights.as_ref().and_then(|w| w.first()) {
            skip_first = first
                .as_deref()
                .map_or(false, |cell| cell.parse::<f64>().is_err());
            if skip_first {
                log::debug!("First row has a non-numeric weight, treating it as a header");
            }
        }
    }

    let mut graph = Graph::new(options.directed);
    let start = usize::from(skip_first);
    log::debug!("Reading {} edge rows", df.height().saturating_sub(start));

    for row in start..df.height() {
        let (source, target) = match (&sources[row], &targets[row]) {
            (Some(source), Some(target)) => (source, target),
            (None, None) => continue,
            _ => return Err(GraphError::MalformedInput(format!(
                "row {}: missing source or target",
                row + 1
            ))),
        };

        let mut edge = Edge::new(source.as_str(), target.as_str());
        if let Some(Some(raw)) = weights.as_ref().map(|w| &w[row]) {
            edge = edge.with_weight(parse_weight(raw, row)?);
        }
        graph.add_edge(edge)?;
    }

    Ok(graph)
}

/// Load an edge list from comma or tab separated text
pub fn load_edge_list(path: &Path, options: &IngestOptions) -> Result<Graph> {
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| default_delimiter(path));

    match read_table(path, delimiter, None, false)? {
        Some(df) => {
            log::info!("Found {} rows in {}", df.height(), path.display());
            edges_from_frame(&df, options, true)
        }
        None => Ok(Graph::new(options.directed)),
    }
}

/// Load an undirected graph from a labelled square adjacency matrix
pub fn load_adjacency_matrix(path: &Path, delimiter: u8) -> Result<Graph> {
    let Some(df) = read_table(path, delimiter, None, false)? else {
        return Ok(Graph::undirected());
    };

    let columns: Vec<Vec<Option<String>>> = (0..df.width())
        .map(|idx| column_strings(&df, idx))
        .collect::<Result<_>>()?;

    let column_labels: Vec<String> = columns[1..]
        .iter()
        .enumerate()
        .map(|(j, col)| {
            col[0].clone().ok_or_else(|| {
                GraphError::MalformedInput(format!("matrix column {} has no label", j + 1))
            })
        })
        .collect::<Result<_>>()?;
    let row_labels: Vec<String> = columns[0][1..]
        .iter()
        .enumerate()
        .map(|(i, label)| {
            label.clone().ok_or_else(|| {
                GraphError::MalformedInput(format!("matrix row {} has no label", i + 1))
            })
        })
        .collect::<Result<_>>()?;

    let n = row_labels.len();
    if column_labels.len() != n {
        return Err(GraphError::MalformedInput(format!(
            "adjacency matrix must be square, got {} rows and {} columns",
            n,
            column_labels.len()
        )));
    }

    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();
    if row_index.len() != n {
        return Err(GraphError::MalformedInput(
            "adjacency matrix has duplicate row labels".to_string(),
        ));
    }

    let mut matrix = Array2::<f64>::zeros((n, n));
    let mut seen_columns = vec![false; n];
    for (j, label) in column_labels.iter().enumerate() {
        let Some(&col) = row_index.get(label.as_str()) else {
            return Err(GraphError::MalformedInput(format!(
                "column label '{}' has no matching row",
                label
            )));
        };
        if seen_columns[col] {
            return Err(GraphError::MalformedInput(format!(
                "duplicate column label '{}'",
                label
            )));
        }
        seen_columns[col] = true;

        for (i, cell) in columns[j + 1][1..].iter().enumerate() {
            if let Some(raw) = cell {
                matrix[[i, col]] = parse_weight(raw, i + 1)?;
            }
        }
    }

    let mut graph = Graph::undirected();
    for label in &row_labels {
        graph.add_node(Node::new(label.as_str()));
    }
    for i in 0..n {
        for j in i..n {
            let weight = if matrix[[i, j]] != 0.0 {
                matrix[[i, j]]
            } else {
                matrix[[j, i]]
            };
            if weight != 0.0 {
                graph.add_edge(
                    Edge::new(row_labels[i].as_str(), row_labels[j].as_str()).with_weight(weight),
                )?;
            }
        }
    }

    log::info!("Adjacency matrix {}x{} read from {}", n, n, path.display());
    Ok(graph)
}

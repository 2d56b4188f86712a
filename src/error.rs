//! Error types for the graph analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tabular data error: {0}")]
    Tabular(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, GraphError>;

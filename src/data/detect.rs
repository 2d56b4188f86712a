//! Input format auto-detection

use std::collections::HashSet;
use std::path::Path;

use crate::data::tabular::{column_strings, read_table};
use crate::data::InputFormat;
use crate::error::{GraphError, Result};

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Separator implied by the file extension: tab for `.txt`/`.tsv`, comma otherwise
pub fn default_delimiter(path: &Path) -> u8 {
    match extension(path).as_str() {
        "txt" | "tsv" => b'\t',
        _ => b',',
    }
}

/// Pick an input format from the extension, sampling tabular files
pub fn detect_format(path: &Path, delimiter: Option<u8>) -> Result<InputFormat> {
    let format = match extension(path).as_str() {
        "csv" | "txt" | "tsv" => {
            let delimiter = delimiter.unwrap_or_else(|| default_delimiter(path));
            match looks_like_adjacency(path, delimiter) {
                Ok(true) => InputFormat::Adjacency,
                Ok(false) => InputFormat::Csv,
                Err(err) => {
                    log::debug!("Sampling {} failed ({}), reading as edge list", path.display(), err);
                    InputFormat::Csv
                }
            }
        }
        "json" => InputFormat::Json,
        "graphml" | "xml" => InputFormat::GraphMl,
        "parquet" => InputFormat::Parquet,
        other => {
            return Err(GraphError::UnsupportedFormat(format!(
                "unsupported file extension '.{}'",
                other
            )))
        }
    };

    log::info!("Detected format for {}: {}", path.display(), format);
    Ok(format)
}

/// Sample the head of a tabular file and decide whether it is an adjacency matrix
///
/// The header row minus its corner cell gives the column labels. The file is a
/// matrix only when exactly that many data rows follow, every cell past the
/// label column is numeric or empty, and the row label set equals the column
/// label set. Sampling goes through the same reader as loading.
pub fn looks_like_adjacency(path: &Path, delimiter: u8) -> Result<bool> {
    let Some(head) = read_table(path, delimiter, Some(1), true)? else {
        return Ok(false);
    };
    let labels = head.width().saturating_sub(1);
    if labels == 0 {
        return Ok(false);
    }

    // One row past the expected end tells a matrix from a longer edge list
    let Some(sample) = read_table(path, delimiter, Some(labels + 2), true)? else {
        return Ok(false);
    };
    if sample.width() != labels + 1 || sample.height() != labels + 1 {
        return Ok(false);
    }

    let columns: Vec<Vec<Option<String>>> = (0..sample.width())
        .map(|idx| column_strings(&sample, idx))
        .collect::<Result<_>>()?;

    let mut column_labels = HashSet::with_capacity(labels);
    for column in &columns[1..] {
        let Some(label) = &column[0] else {
            return Ok(false);
        };
        let numeric = column[1..]
            .iter()
            .flatten()
            .all(|cell| cell.parse::<f64>().is_ok());
        if !numeric {
            return Ok(false);
        }
        column_labels.insert(label.as_str());
    }

    let row_labels: HashSet<&str> = columns[0][1..]
        .iter()
        .map(|label| label.as_deref().unwrap_or_default())
        .collect();
    Ok(column_labels == row_labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn detects_adjacency_matrix() {
        let file = temp_file(".csv", ",a,b,c\na,0,1,1\nb,1,0,1\nc,1,1,0\n");
        assert_eq!(detect_format(file.path(), None).unwrap(), InputFormat::Adjacency);
    }

    #[test]
    fn detects_edge_list() {
        let file = temp_file(".csv", "# comment\na,b\nb,c\n");
        assert_eq!(detect_format(file.path(), None).unwrap(), InputFormat::Csv);
    }

    #[test]
    fn weighted_edge_list_is_not_a_matrix() {
        let file = temp_file(".txt", "x\ty\t1.0\ny\tx\t2.0\n");
        assert_eq!(detect_format(file.path(), None).unwrap(), InputFormat::Csv);
    }

    #[test]
    fn chained_numeric_edge_list_is_not_a_matrix() {
        let file = temp_file(".txt", "1\t2\n2\t3\n3\t4\n");
        assert_eq!(detect_format(file.path(), None).unwrap(), InputFormat::Csv);

        let graph = crate::data::load_graph(file.path(), &Default::default()).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn quoted_labels_are_sampled_like_loading() {
        let file = temp_file(
            ".csv",
            ",\"Smith, A\",\"Lee, B\"\n\"Smith, A\",0,1\n\"Lee, B\",1,0\n",
        );
        assert_eq!(detect_format(file.path(), None).unwrap(), InputFormat::Adjacency);

        let graph = crate::data::load_graph(file.path(), &Default::default()).unwrap();
        assert!(graph.contains_node("Smith, A"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn extension_routing() {
        assert_eq!(detect_format(Path::new("g.json"), None).unwrap(), InputFormat::Json);
        assert_eq!(detect_format(Path::new("g.xml"), None).unwrap(), InputFormat::GraphMl);
        assert_eq!(detect_format(Path::new("g.parquet"), None).unwrap(), InputFormat::Parquet);
        assert!(matches!(
            detect_format(Path::new("g.pkl"), None),
            Err(GraphError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn unreadable_tabular_file_defaults_to_edge_list() {
        assert_eq!(
            detect_format(Path::new("/missing/graph.csv"), None).unwrap(),
            InputFormat::Csv
        );
    }
}

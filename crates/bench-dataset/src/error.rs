//! Error types for dataset loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a dataset file.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// An expected column is absent from the header row.
    #[error("Column '{column}' not found in {source_name}")]
    MissingColumn { source_name: String, column: String },

    /// A cell could not be parsed as its column's declared kind.
    #[error("{source_name} line {line}, column '{column}': cannot parse '{value}' as {expected}")]
    InvalidValue {
        source_name: String,
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },
}

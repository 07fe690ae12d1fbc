//! Error types for survey ingestion.

use std::path::PathBuf;

use ess_model::ModelError;
use ess_xpt::XptError;
use thiserror::Error;

/// Errors that can occur while loading and preparing the source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is neither `.csv` nor `.xpt`.
    #[error("unsupported source format: {path} (expected .csv or .xpt)")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Failed to read a SAS transport file.
    #[error("failed to read XPT {path}: {source}")]
    Xpt {
        path: PathBuf,
        #[source]
        source: XptError,
    },

    // === Configuration Errors ===
    /// Study configuration could not be parsed.
    #[error("invalid study configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Study configuration is inconsistent.
    #[error("invalid study configuration: {message}")]
    InvalidConfig { message: String },

    /// Selected columns absent from a source table.
    #[error("{table} table is missing selected column(s): {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// Country column absent from a source table.
    #[error("{table} table has no country column '{column}'")]
    MissingCountryColumn { table: String, column: String },

    // === Data Errors ===
    /// A cell does not match its codebook entry.
    #[error("{table} table, row {row}: {source}")]
    Decode {
        table: String,
        row: usize,
        #[source]
        source: ModelError,
    },

    /// A count column holds a negative or fractional value.
    #[error("{table} table, row {row}: column {column} value {value} is not a whole count")]
    InvalidCount {
        table: String,
        row: usize,
        column: String,
        value: f64,
    },

    /// A quantity column holds a negative value.
    #[error("{table} table, row {row}: column {column} value {value} is negative")]
    NegativeValue {
        table: String,
        row: usize,
        column: String,
        value: f64,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/ess7_main.csv"),
        };
        assert_eq!(err.to_string(), "source file not found: /data/ess7_main.csv");

        let err = IngestError::MissingColumns {
            table: "responses".to_string(),
            columns: vec!["alcwkdy".to_string(), "alcwknd".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "responses table is missing selected column(s): alcwkdy, alcwknd"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("idno".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}

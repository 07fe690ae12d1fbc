//! Error types for the merge and recode stages.

use thiserror::Error;

/// Errors raised while merging tables or building the output frame.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A right-hand table holds two rows for the same unit.
    #[error("duplicate key in {table} table: idno {idno} appears more than once")]
    DuplicateKey { table: String, idno: i64 },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

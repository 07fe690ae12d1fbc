//! Error types for XPT file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing XPT files.
#[derive(Debug, Error)]
pub enum XptError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("invalid XPT file: {message}")]
    InvalidFormat { message: String },

    #[error("missing header: expected {expected}")]
    MissingHeader { expected: &'static str },

    #[error("invalid NAMESTR at index {index}: {message}")]
    InvalidNamestr { index: usize, message: String },

    /// Value outside the IBM floating-point range.
    #[error("float conversion error: {message}")]
    FloatConversion { message: String },

    #[error("invalid dataset name: {name:?}")]
    InvalidDatasetName { name: String },

    #[error("invalid variable name: {name:?}")]
    InvalidVariableName { name: String },

    #[error("duplicate variable name: {name}")]
    DuplicateVariable { name: String },

    #[error("label for {name} exceeds 40 characters")]
    LabelTooLong { name: String },

    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    #[error("value in column {name} does not match its type")]
    TypeMismatch { name: String },

    #[error("record out of bounds at offset {offset}")]
    RecordOutOfBounds { offset: usize },

    #[error("failed to parse numeric field: {field}")]
    NumericParse { field: String },

    #[error("observation length overflow")]
    ObservationOverflow,

    #[error("unexpected trailing bytes in observations")]
    TrailingBytes,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for XPT operations.
pub type Result<T> = std::result::Result<T, XptError>;

impl XptError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn missing_header(expected: &'static str) -> Self {
        Self::MissingHeader { expected }
    }
}

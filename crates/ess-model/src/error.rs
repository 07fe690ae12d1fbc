use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid variable name: {0:?}")]
    InvalidVarName(String),
    #[error("duplicate codebook entry for column {0}")]
    DuplicateCodebookEntry(String),
    #[error("codebook entry {column}: {message}")]
    InvalidColumnSpec { column: String, message: String },
    #[error("column {column}: identifier is missing")]
    MissingIdentifier { column: String },
    #[error("column {column}: {value:?} is not an integer identifier")]
    InvalidIdentifier { column: String, value: String },
    #[error("column {column}: {value:?} is not numeric")]
    InvalidNumber { column: String, value: String },
    #[error("column {column}: code {code:?} has no value label")]
    UnknownCode { column: String, code: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

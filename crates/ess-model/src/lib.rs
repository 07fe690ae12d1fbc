//! Typed data model for the ESS survey preparation pipeline.
//!
//! - **schema**: codebook entries declaring each column as identifier, numeric or categorical
//! - **value**: explicit cell values, with missingness as its own variant
//! - **categories**: closed enumerations for smoking status and drinking frequency
//! - **records**: per-unit sample, paradata and response records and their merge
//! - **table**: typed tables with column metadata

pub mod categories;
pub mod error;
pub mod ids;
pub mod records;
pub mod schema;
pub mod table;
pub mod value;

pub use categories::{AlcoholFrequency, ResponseStatus, SmokingStatus};
pub use error::{ModelError, Result};
pub use ids::UnitId;
pub use records::{
    DerivedOutcomes, MergedUnit, ParadataRecord, ResponseRecord, SampleRecord, UnitRecord,
};
pub use schema::{Codebook, ColumnKind, ColumnSpec};
pub use table::{ColumnMeta, SurveyTable};
pub use value::{Category, CellValue, format_numeric, normalize_code};

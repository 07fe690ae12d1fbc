//! Merge and recode stages of the ESS preparation pipeline.
//!
//! - **merge**: left joins of sample design and questionnaire records onto
//!   the contact-form anchor, sorted by contact outcome
//! - **recode**: cigarettes and alcohol consumption per day
//! - **frame**: the merged table as a typed Polars DataFrame

pub mod error;
pub mod frame;
pub mod merge;
pub mod recode;

pub use error::{Result, TransformError};
pub use frame::to_dataframe;
pub use merge::{
    ColumnOrigin, DerivedColumn, MergeStats, MergedColumn, MergedTable, merge_tables,
    sort_by_outcome,
};
pub use recode::{
    RecodeStats, daily_baseline, derive_outcomes, recode_alcohol, recode_cigarettes,
    recode_table, recode_units,
};

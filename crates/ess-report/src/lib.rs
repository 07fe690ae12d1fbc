//! Reporting stage of the ESS preparation pipeline.
//!
//! Builds the study summary (table dimensions, response partition, derived
//! outcome statistics, variable listings) and writes the prepared table as
//! CSV or SAS transport.

pub mod error;
pub mod preview;
pub mod summary;
pub mod variables;
pub mod writer;

pub use error::{ReportError, Result};
pub use preview::{DEFAULT_HEAD_ROWS, Preview, head_preview};
pub use summary::{
    OutcomeSummary, ResponsePartition, StudySummary, SummaryInputs, TableDimensions,
    VariableEntry, VariableListing, outcome_summaries, response_partition,
};
pub use variables::{render_variables_csv, write_variables_csv};
pub use writer::{
    OutputFormats, PREPARED_CSV, PREPARED_XPT, SUMMARY_JSON, VARIABLES_CSV, WrittenOutputs,
    XPT_DATASET_NAME, build_xpt_dataset, summary_to_json, write_outputs, write_prepared_csv,
    write_prepared_xpt, write_summary_json,
};

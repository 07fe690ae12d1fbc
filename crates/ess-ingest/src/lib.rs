//! Survey ingestion for the ESS preparation pipeline.
//!
//! Reads the sample design, contact-form and questionnaire extracts (CSV or
//! SAS transport), filters them to one country, projects each to its
//! configured columns and decodes the cells against the study codebook.

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod polars_utils;
pub mod reader;
pub mod select;
pub mod study;

pub use config::{
    DEFAULT_COMPLETE_INTERVIEW, DEFAULT_COUNTRY, RoleBinding, Roles, SourceConfig, Sources,
    StudyConfig, TableKind, load_config, parse_config,
};
pub use error::{IngestError, Result};
pub use extract::{DecodedFrame, decode_frame, extract_paradata, extract_responses, extract_sample};
pub use filter::filter_country;
pub use polars_utils::{any_to_string, any_to_string_non_empty, column_text};
pub use reader::{LabeledFrame, SourceFormat, read_csv_frame, read_source, read_xpt_frame};
pub use select::{check_selection, select_columns};
pub use study::{LoadOptions, StudyTables, load_study};

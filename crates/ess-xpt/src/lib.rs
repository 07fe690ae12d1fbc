//! SAS Transport (XPT) V5 reader and writer.
//!
//! Survey archives distribute extracts in statistical-software formats; XPT
//! is the openly documented one. This crate reads and writes single-member
//! V5 transport files: named, labelled columns of 8-byte IBM floats or
//! fixed-width text.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ess_xpt::{XptColumn, XptDataset, XptValue, read_xpt, write_xpt};
//!
//! let mut ds = XptDataset::with_columns(
//!     "SDDF",
//!     vec![
//!         XptColumn::numeric("IDNO").with_label("Respondent identification number"),
//!         XptColumn::character("CNTRY", 2).with_label("Country"),
//!     ],
//! );
//! ds.add_row(vec![XptValue::numeric(1001.0), XptValue::character("GB")]);
//! write_xpt(Path::new("sddf.xpt"), &ds).unwrap();
//!
//! let back = read_xpt(Path::new("sddf.xpt")).unwrap();
//! println!("{} ({} rows)", back.name, back.num_rows());
//! ```

mod error;
pub mod float;
pub mod header;
mod reader;
mod types;
mod writer;

pub use error::{Result, XptError};
pub use reader::{XptReader, read_xpt};
pub use types::{XptColumn, XptDataset, XptType, XptValue, XptWriterOptions};
pub use writer::{XptWriter, write_xpt, write_xpt_with_options};

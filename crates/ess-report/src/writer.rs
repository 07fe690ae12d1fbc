//! Output files for the prepared table.
//!
//! All outputs land in one directory: `prepared.csv`, `prepared.xpt`,
//! `variables.csv` and `summary.json`.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use ess_model::{CellValue, ColumnKind};
use ess_transform::{ColumnOrigin, DerivedColumn, MergedColumn, MergedTable, to_dataframe};
use ess_xpt::{XptColumn, XptDataset, XptValue, XptWriterOptions, write_xpt_with_options};
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::summary::StudySummary;
use crate::variables::write_variables_csv;

pub const PREPARED_CSV: &str = "prepared.csv";
pub const PREPARED_XPT: &str = "prepared.xpt";
pub const VARIABLES_CSV: &str = "variables.csv";
pub const SUMMARY_JSON: &str = "summary.json";

/// Member name of the transport file.
pub const XPT_DATASET_NAME: &str = "ESSPREP";

const XPT_NAME_LEN: usize = 8;
const XPT_LABEL_LEN: usize = 40;
const XPT_MAX_CHAR_LEN: usize = 200;

/// Which files [`write_outputs`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormats {
    pub csv: bool,
    pub xpt: bool,
    pub variables: bool,
    pub summary: bool,
}

impl Default for OutputFormats {
    fn default() -> Self {
        Self {
            csv: true,
            xpt: false,
            variables: true,
            summary: true,
        }
    }
}

/// Paths written by [`write_outputs`], in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrittenOutputs {
    pub files: Vec<PathBuf>,
}

/// Write the selected outputs into `dir`, creating it when needed.
pub fn write_outputs(
    dir: &Path,
    table: &MergedTable,
    summary: &StudySummary,
    formats: OutputFormats,
    xpt_options: &XptWriterOptions,
) -> Result<WrittenOutputs> {
    std::fs::create_dir_all(dir).map_err(|err| ReportError::io(dir, err))?;
    let mut written = WrittenOutputs::default();

    if formats.csv {
        let path = dir.join(PREPARED_CSV);
        write_prepared_csv(&path, table)?;
        written.files.push(path);
    }
    if formats.xpt {
        let path = dir.join(PREPARED_XPT);
        write_prepared_xpt(&path, table, xpt_options)?;
        written.files.push(path);
    }
    if formats.variables
        && let Some(listing) = summary.merged_variables()
    {
        let path = dir.join(VARIABLES_CSV);
        write_variables_csv(&path, listing)?;
        written.files.push(path);
    }
    if formats.summary {
        let path = dir.join(SUMMARY_JSON);
        write_summary_json(&path, summary)?;
        written.files.push(path);
    }

    for path in &written.files {
        tracing::info!(path = %path.display(), "Wrote output");
    }
    Ok(written)
}

/// Prepared table as CSV with a header row. Unset cells are empty.
pub fn write_prepared_csv(path: &Path, table: &MergedTable) -> Result<()> {
    let mut df = to_dataframe(table)?;
    let mut file = File::create(path).map_err(|err| ReportError::io(path, err))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

pub fn write_prepared_xpt(
    path: &Path,
    table: &MergedTable,
    options: &XptWriterOptions,
) -> Result<()> {
    let dataset = build_xpt_dataset(table, XPT_DATASET_NAME);
    write_xpt_with_options(path, &dataset, options.clone())?;
    Ok(())
}

pub fn summary_to_json(summary: &StudySummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

pub fn write_summary_json(path: &Path, summary: &StudySummary) -> Result<()> {
    let file = File::create(path).map_err(|err| ReportError::io(path, err))?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

/// Transport dataset of the prepared table.
///
/// Identifiers and numerics become 8-byte numerics; categoricals become
/// text wide enough for their longest label.
pub fn build_xpt_dataset(table: &MergedTable, name: &str) -> XptDataset {
    let names = xpt_names(&table.columns);
    let columns: Vec<XptColumn> = table
        .columns
        .iter()
        .zip(names)
        .map(|(column, xpt_name)| build_xpt_column(table, column, xpt_name))
        .collect();

    let mut dataset = XptDataset::with_columns(name, columns);
    for unit in &table.units {
        let row = table
            .columns
            .iter()
            .map(|column| xpt_value(column.meta.kind, &table.cell(unit, column)))
            .collect();
        dataset.add_row(row);
    }
    dataset
}

fn build_xpt_column(table: &MergedTable, column: &MergedColumn, name: String) -> XptColumn {
    let xpt = match column.meta.kind {
        ColumnKind::Identifier | ColumnKind::Numeric => XptColumn::numeric(name),
        ColumnKind::Categorical => {
            let width = table
                .units
                .iter()
                .map(|unit| table.cell(unit, column).display().chars().count())
                .max()
                .unwrap_or(0)
                .clamp(1, XPT_MAX_CHAR_LEN);
            XptColumn::character(name, width as u16)
        }
    };
    match &column.meta.label {
        Some(label) => xpt.with_label(label.chars().take(XPT_LABEL_LEN).collect::<String>()),
        None => xpt,
    }
}

fn xpt_value(kind: ColumnKind, cell: &CellValue) -> XptValue {
    match kind {
        ColumnKind::Identifier | ColumnKind::Numeric => XptValue::Num(cell.as_number()),
        ColumnKind::Categorical => XptValue::Char(cell.display()),
    }
}

/// Unique transport names: upper case, at most 8 characters.
fn xpt_names(columns: &[MergedColumn]) -> Vec<String> {
    let mut taken = BTreeSet::new();
    columns
        .iter()
        .map(|column| {
            let base = match column.origin {
                ColumnOrigin::Derived(DerivedColumn::CigarettesPerDay) => "CIGDAY".to_string(),
                ColumnOrigin::Derived(DerivedColumn::AlcoholGramsPerDay) => "ALCGDAY".to_string(),
                _ => sanitize_name(column.name()),
            };
            let mut candidate = base.clone();
            let mut suffix = 1usize;
            while !taken.insert(candidate.clone()) {
                let tail = suffix.to_string();
                let keep = XPT_NAME_LEN.saturating_sub(tail.len()).min(base.len());
                candidate = format!("{}{tail}", &base[..keep]);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out.truncate(XPT_NAME_LEN);
    out
}

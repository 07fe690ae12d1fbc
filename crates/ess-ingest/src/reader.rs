//! Source file reading.
//!
//! Every source becomes a [`LabeledFrame`]: a Polars DataFrame of raw text
//! cells plus the variable labels the file itself carries. Typing happens
//! later, against the codebook.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ess_model::format_numeric;
use ess_xpt::{XptError, XptValue, read_xpt};
use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Source formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xpt,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("xpt") => Ok(SourceFormat::Xpt),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A raw source table with its column labels.
#[derive(Debug, Clone)]
pub struct LabeledFrame {
    /// Table name used in messages (`sample`, `paradata`, `responses`).
    pub name: String,
    pub source: PathBuf,
    pub data: DataFrame,
    /// Column name -> label stored in the file.
    pub labels: BTreeMap<String, String>,
}

impl LabeledFrame {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            data,
            labels: BTreeMap::new(),
        }
    }

    pub fn label(&self, column: &str) -> Option<&str> {
        self.labels.get(column).map(String::as_str)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.data.get_column_index(column).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }
}

/// Read a source file, choosing the format by extension.
///
/// `header_rows` applies to CSV only: with 2, the first row holds labels and
/// the second the column names.
pub fn read_source(name: &str, path: &Path, header_rows: usize) -> Result<LabeledFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let frame = match SourceFormat::from_path(path)? {
        SourceFormat::Csv => read_csv_frame(name, path, header_rows)?,
        SourceFormat::Xpt => read_xpt_frame(name, path)?,
    };
    tracing::debug!(
        table = name,
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        labels = frame.labels.len(),
        "Read source table"
    );
    Ok(frame)
}

/// Read a CSV file with every column as text.
pub fn read_csv_frame(name: &str, path: &Path, header_rows: usize) -> Result<LabeledFrame> {
    let header_lines = read_header_records(path, header_rows.max(1))?;
    let Some(names) = header_lines.last() else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };

    let mut labels = BTreeMap::new();
    if header_rows >= 2 && header_lines.len() >= 2 {
        for (name, label) in names.iter().zip(&header_lines[0]) {
            let label = label.trim();
            if !label.is_empty() {
                labels.insert(name.trim().to_string(), label.to_string());
            }
        }
    }

    let data = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(header_rows.saturating_sub(1))
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut frame = LabeledFrame::new(name, path, data);
    frame.labels = labels;
    Ok(frame)
}

/// First `n` records of a CSV file, BOM stripped.
fn read_header_records(path: &Path, n: usize) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let mut records = Vec::with_capacity(n);
    for record in reader.records().take(n) {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        records.push(
            record
                .iter()
                .map(|field| field.trim_start_matches('\u{feff}').to_string())
                .collect(),
        );
    }
    Ok(records)
}

/// Read a SAS transport file. Column names are lower-cased (SAS names are
/// case-insensitive), numerics become normalised text and SAS missing
/// values become nulls.
pub fn read_xpt_frame(name: &str, path: &Path) -> Result<LabeledFrame> {
    let dataset = read_xpt(path).map_err(|e| match e {
        XptError::FileNotFound { path } => IngestError::FileNotFound { path },
        source => IngestError::Xpt {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut labels = BTreeMap::new();
    let mut columns = Vec::with_capacity(dataset.columns.len());
    for (idx, column) in dataset.columns.iter().enumerate() {
        let column_name = column.name.to_lowercase();
        let values: Vec<Option<String>> = dataset
            .rows
            .iter()
            .map(|row| match row.get(idx) {
                Some(XptValue::Num(Some(value))) => Some(format_numeric(*value)),
                Some(XptValue::Char(text)) if !text.trim().is_empty() => Some(text.clone()),
                _ => None,
            })
            .collect();
        if let Some(label) = column.label.as_ref().filter(|label| !label.trim().is_empty()) {
            labels.insert(column_name.clone(), label.clone());
        }
        columns.push(Series::new(column_name.as_str().into(), values).into_column());
    }

    let mut frame = LabeledFrame::new(name, path, DataFrame::new(columns)?);
    frame.labels = labels;
    Ok(frame)
}

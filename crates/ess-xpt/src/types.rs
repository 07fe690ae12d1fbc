//! Core types for XPT datasets.

use chrono::NaiveDateTime;

/// Variable storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XptType {
    Num,
    Char,
}

impl XptType {
    pub fn from_ntype(ntype: i16) -> Option<Self> {
        match ntype {
            1 => Some(XptType::Num),
            2 => Some(XptType::Char),
            _ => None,
        }
    }

    pub fn to_ntype(self) -> i16 {
        match self {
            XptType::Num => 1,
            XptType::Char => 2,
        }
    }
}

/// Variable definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XptColumn {
    pub name: String,
    pub label: Option<String>,
    pub data_type: XptType,
    /// Width in bytes within an observation (numerics: 2-8).
    pub length: u16,
}

impl XptColumn {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Num,
            length: 8,
        }
    }

    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Char,
            length,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A single cell. Numeric `None` is a SAS missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum XptValue {
    Num(Option<f64>),
    Char(String),
}

impl XptValue {
    pub fn numeric(value: f64) -> Self {
        XptValue::Num(Some(value))
    }

    pub fn numeric_missing() -> Self {
        XptValue::Num(None)
    }

    pub fn character(value: impl Into<String>) -> Self {
        XptValue::Char(value.into())
    }

    /// Missing numerics and blank strings.
    pub fn is_missing(&self) -> bool {
        match self {
            XptValue::Num(value) => value.is_none(),
            XptValue::Char(value) => value.trim().is_empty(),
        }
    }
}

/// One dataset (member) of a transport file.
#[derive(Debug, Clone, PartialEq)]
pub struct XptDataset {
    pub name: String,
    pub label: Option<String>,
    pub columns: Vec<XptColumn>,
    pub rows: Vec<Vec<XptValue>>,
}

impl XptDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_columns(name, Vec::new())
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<XptColumn>) -> Self {
        Self {
            name: name.into(),
            label: None,
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn add_row(&mut self, row: Vec<XptValue>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Bytes per observation.
    pub fn observation_length(&self) -> usize {
        self.columns.iter().map(|column| column.length as usize).sum()
    }
}

/// Header metadata written into a new file.
#[derive(Debug, Clone)]
pub struct XptWriterOptions {
    pub sas_version: String,
    pub os_name: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

impl Default for XptWriterOptions {
    fn default() -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            sas_version: "9.4".to_string(),
            os_name: "RUST".to_string(),
            created: now,
            modified: now,
        }
    }
}

impl XptWriterOptions {
    #[must_use]
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self.modified = created;
        self
    }

    /// Created datetime as `ddMMMyy:hh:mm:ss`.
    pub fn format_created(&self) -> String {
        format_xpt_datetime(self.created)
    }

    pub fn format_modified(&self) -> String {
        format_xpt_datetime(self.modified)
    }
}

fn format_xpt_datetime(value: NaiveDateTime) -> String {
    value.format("%d%b%y:%H:%M:%S").to_string().to_uppercase()
}

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::schema::ColumnKind;

/// Name, label and declared kind of a column in a typed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub label: Option<String>,
    pub kind: ColumnKind,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, label: Option<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            label,
            kind,
        }
    }
}

/// A country-scoped, column-selected table of typed records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyTable<R> {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub records: Vec<R>,
}

impl<R> SurveyTable<R> {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMeta>) -> Self {
        Self {
            name: name.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn with_records(mut self, records: Vec<R>) -> Self {
        self.records = records;
        self
    }

    pub fn height(&self) -> usize {
        self.records.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

//! First rows of the prepared table as display text.

use ess_transform::MergedTable;
use serde::Serialize;

/// Default number of preview rows.
pub const DEFAULT_HEAD_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the full table.
    pub total_rows: usize,
}

impl Preview {
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}

/// Up to `n` rows, one string per cell. Unset cells are empty.
pub fn head_preview(table: &MergedTable, n: usize) -> Preview {
    let rows = table
        .units
        .iter()
        .take(n)
        .map(|unit| {
            table
                .columns
                .iter()
                .map(|column| table.cell(unit, column).display())
                .collect()
        })
        .collect();
    Preview {
        columns: table.columns.iter().map(|c| c.name().to_string()).collect(),
        rows,
        total_rows: table.height(),
    }
}

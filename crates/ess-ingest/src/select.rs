//! Column selection.

use crate::error::{IngestError, Result};
use crate::reader::LabeledFrame;

/// Check that every requested column exists. All absent columns are
/// reported together.
pub fn check_selection(frame: &LabeledFrame, columns: &[String]) -> Result<()> {
    let missing: Vec<String> = columns
        .iter()
        .filter(|column| !frame.has_column(column))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            table: frame.name.clone(),
            columns: missing,
        })
    }
}

/// Project the frame to exactly `columns`, in that order. Row order and
/// the labels of retained columns are preserved.
pub fn select_columns(frame: LabeledFrame, columns: &[String]) -> Result<LabeledFrame> {
    check_selection(&frame, columns)?;
    let data = frame.data.select(columns.iter().map(String::as_str))?;
    let labels = frame
        .labels
        .into_iter()
        .filter(|(name, _)| columns.contains(name))
        .collect();
    tracing::debug!(
        table = %frame.name,
        columns = data.width(),
        "Selected columns"
    );
    Ok(LabeledFrame {
        name: frame.name,
        source: frame.source,
        data,
        labels,
    })
}

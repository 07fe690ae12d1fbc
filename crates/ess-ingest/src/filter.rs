//! Country filter.

use ess_model::{ColumnSpec, normalize_code};
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::polars_utils::column_text;
use crate::reader::LabeledFrame;

/// Keep the rows whose country cell matches `country`.
///
/// A cell matches when its display label (via the codebook value labels)
/// or its stored code equals `country`, ignoring case and surrounding
/// whitespace. An empty result is logged, not an error.
pub fn filter_country(
    frame: LabeledFrame,
    column: &str,
    spec: &ColumnSpec,
    country: &str,
) -> Result<LabeledFrame> {
    if !frame.has_column(column) {
        return Err(IngestError::MissingCountryColumn {
            table: frame.name.clone(),
            column: column.to_string(),
        });
    }
    let target = country.trim();
    let keep: Vec<bool> = column_text(&frame.data, column)?
        .iter()
        .map(|cell| {
            cell.as_deref()
                .is_some_and(|raw| matches_country(spec, raw, target))
        })
        .collect();

    let before = frame.height();
    let mask = BooleanChunked::from_slice(column.into(), &keep);
    let data = frame.data.filter(&mask)?;
    let kept = data.height();
    if kept == 0 {
        tracing::warn!(
            table = %frame.name,
            country = target,
            rows = before,
            "No rows match the target country"
        );
    } else {
        tracing::debug!(
            table = %frame.name,
            country = target,
            before,
            kept,
            "Filtered to country"
        );
    }
    Ok(LabeledFrame { data, ..frame })
}

fn matches_country(spec: &ColumnSpec, raw: &str, target: &str) -> bool {
    let code = normalize_code(raw);
    code.eq_ignore_ascii_case(target)
        || spec
            .value_label(&code)
            .is_some_and(|label| label.trim().eq_ignore_ascii_case(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> LabeledFrame {
        let data = DataFrame::new(vec![
            Column::new("idno".into(), vec!["1", "2", "3", "4"]),
            Column::new("cntry".into(), vec![Some("GB"), Some("DE"), None, Some("GB")]),
        ])
        .unwrap();
        LabeledFrame::new("sample", "sample.csv", data)
    }

    fn cntry() -> ColumnSpec {
        ColumnSpec::categorical("cntry")
            .with_value("GB", "United Kingdom")
            .with_value("DE", "Germany")
    }

    #[test]
    fn keeps_rows_by_label() {
        let filtered = filter_country(frame(), "cntry", &cntry(), "United Kingdom").unwrap();
        assert_eq!(filtered.height(), 2);
        let ids = column_text(&filtered.data, "idno").unwrap();
        assert_eq!(ids, vec![Some("1".to_string()), Some("4".to_string())]);
    }

    #[test]
    fn keeps_rows_by_code() {
        let filtered = filter_country(frame(), "cntry", &cntry(), "de").unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn no_match_yields_empty_table() {
        let filtered = filter_country(frame(), "cntry", &cntry(), "France").unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), 2);
    }

    #[test]
    fn missing_country_column_is_an_error() {
        let result = filter_country(frame(), "country", &cntry(), "United Kingdom");
        assert!(matches!(
            result,
            Err(IngestError::MissingCountryColumn { .. })
        ));
    }
}

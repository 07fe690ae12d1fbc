//! Polars AnyValue utility functions.

use ess_model::format_numeric;
use polars::prelude::*;

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null; floats lose trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None if the result is blank.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Raw cell text of one column, row by row. Blank cells are `None`.
pub fn column_text(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?;
    (0..df.height())
        .map(|idx| column.get(idx).map(any_to_string_non_empty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(1001)), "1001");
        assert_eq!(any_to_string(AnyValue::Float64(2.0)), "2");
        assert_eq!(any_to_string(AnyValue::String("GB")), "GB");
    }

    #[test]
    fn test_column_text() {
        let df = DataFrame::new(vec![Column::new(
            "cntry".into(),
            vec![Some("GB"), None, Some("  ")],
        )])
        .unwrap();
        assert_eq!(
            column_text(&df, "cntry").unwrap(),
            vec![Some("GB".to_string()), None, None]
        );
        assert!(column_text(&df, "idno").is_err());
    }
}

//! Cell values for typed survey tables.

use serde::{Deserialize, Serialize};

/// A categorical value: the stored code and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// One decoded cell. Absence of a value is `Missing`, never a sentinel number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Missing,
    Id(i64),
    Number(f64),
    Category(Category),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_id(&self) -> Option<i64> {
        match self {
            CellValue::Id(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the cell. Identifiers count as numbers, categories do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Id(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match self {
            CellValue::Category(category) => Some(category),
            _ => None,
        }
    }

    /// Text shown in previews and written to delimited output.
    pub fn display(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            CellValue::Id(value) => value.to_string(),
            CellValue::Number(value) => format_numeric(*value),
            CellValue::Category(category) => category.label.clone(),
        }
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Canonical form of a stored code used for value-label lookup.
///
/// Numeric codes are rendered without trailing zeros so `1`, `1.0` and ` 1 `
/// all resolve to `"1"`. Text codes are only trimmed.
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => format_numeric(value),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.5), "1.5");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(-2.0), "-2");
        assert_eq!(format_numeric(100.0), "100");
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("1"), "1");
        assert_eq!(normalize_code("1.0"), "1");
        assert_eq!(normalize_code(" 77 "), "77");
        assert_eq!(normalize_code("GB"), "GB");
        assert_eq!(normalize_code(" GB "), "GB");
    }

    #[test]
    fn display_uses_labels_for_categories() {
        let cell = CellValue::Category(Category::new("1", "Male"));
        assert_eq!(cell.display(), "Male");
        assert_eq!(CellValue::Missing.display(), "");
        assert_eq!(CellValue::Number(2.50).display(), "2.5");
        assert_eq!(CellValue::Id(1001).display(), "1001");
    }

    #[test]
    fn categories_are_not_numbers() {
        let cell = CellValue::Category(Category::new("3", "Once a week"));
        assert_eq!(cell.as_number(), None);
        assert_eq!(CellValue::Id(5).as_number(), Some(5.0));
    }
}

//! Codebook: the declared, strongly typed schema of every selected column.
//!
//! Survey extracts carry loosely typed columns (text, numbers, coded answers
//! with value labels). The codebook fixes each column to one [`ColumnKind`]
//! and lists the value labels and user-missing codes, so decoding happens
//! once, at load time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::{Category, CellValue, normalize_code};

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer key, never missing.
    Identifier,
    /// Real value or missing.
    Numeric,
    /// Stored code with a display label.
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Identifier => "identifier",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identifier" | "id" => Ok(ColumnKind::Identifier),
            "numeric" | "num" => Ok(ColumnKind::Numeric),
            "categorical" | "factor" => Ok(ColumnKind::Categorical),
            _ => Err(format!("Unknown column kind: {s}")),
        }
    }
}

/// Codebook entry for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Human-readable label. Takes precedence over a label stored in the source file.
    #[serde(default)]
    pub label: Option<String>,
    pub kind: ColumnKind,
    /// Stored code -> display label.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Stored codes that denote user-defined missing values.
    #[serde(default)]
    pub missing: Vec<String>,
}

impl ColumnSpec {
    fn with_kind(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            values: BTreeMap::new(),
            missing: Vec::new(),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::with_kind(name, ColumnKind::Identifier)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::with_kind(name, ColumnKind::Numeric)
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self::with_kind(name, ColumnKind::Categorical)
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.values.insert(code.into(), label.into());
        self
    }

    #[must_use]
    pub fn with_missing(mut self, code: impl Into<String>) -> Self {
        self.missing.push(code.into());
        self
    }

    pub fn value_label(&self, code: &str) -> Option<&str> {
        self.values.get(&normalize_code(code)).map(String::as_str)
    }

    pub fn is_missing_code(&self, code: &str) -> bool {
        let code = normalize_code(code);
        self.missing.iter().any(|missing| *missing == code)
    }

    /// Decode one raw cell according to the declared kind.
    ///
    /// Blank cells and user-missing codes decode to [`CellValue::Missing`],
    /// except for identifiers, which must always be present.
    pub fn decode(&self, raw: Option<&str>) -> Result<CellValue> {
        let Some(text) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return match self.kind {
                ColumnKind::Identifier => Err(ModelError::MissingIdentifier {
                    column: self.name.clone(),
                }),
                _ => Ok(CellValue::Missing),
            };
        };
        let code = normalize_code(text);
        match self.kind {
            ColumnKind::Identifier => text
                .parse::<i64>()
                .or_else(|_| code.parse::<i64>())
                .map(CellValue::Id)
                .map_err(|_| ModelError::InvalidIdentifier {
                    column: self.name.clone(),
                    value: text.to_string(),
                }),
            _ if self.is_missing_code(&code) => Ok(CellValue::Missing),
            ColumnKind::Numeric => match code.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(CellValue::Number(value)),
                _ => Err(ModelError::InvalidNumber {
                    column: self.name.clone(),
                    value: text.to_string(),
                }),
            },
            ColumnKind::Categorical => match self.values.get(&code) {
                Some(label) => Ok(CellValue::Category(Category::new(code, label.clone()))),
                None => Err(ModelError::UnknownCode {
                    column: self.name.clone(),
                    code,
                }),
            },
        }
    }

    fn normalized(mut self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ModelError::InvalidVarName(self.name));
        }
        self.name = name;
        let mut values = BTreeMap::new();
        for (code, label) in std::mem::take(&mut self.values) {
            let normalized = normalize_code(&code);
            if normalized.is_empty() {
                return Err(self.invalid("value label with a blank code"));
            }
            if values.insert(normalized.clone(), label).is_some() {
                return Err(self.invalid(&format!("code {normalized:?} is labelled twice")));
            }
        }
        self.values = values;
        self.missing = self.missing.iter().map(|code| normalize_code(code)).collect();
        match self.kind {
            ColumnKind::Identifier if !self.values.is_empty() || !self.missing.is_empty() => {
                Err(self.invalid("identifier columns take no value labels or missing codes"))
            }
            ColumnKind::Categorical if self.values.is_empty() => {
                Err(self.invalid("categorical columns need at least one value label"))
            }
            _ => Ok(self),
        }
    }

    fn invalid(&self, message: &str) -> ModelError {
        ModelError::InvalidColumnSpec {
            column: self.name.clone(),
            message: message.to_string(),
        }
    }
}

/// Validated collection of column specs, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codebook {
    columns: Vec<ColumnSpec>,
}

impl Codebook {
    /// Validate and normalise the entries: names unique and non-blank, codes
    /// canonicalised, categorical columns labelled.
    pub fn new(specs: Vec<ColumnSpec>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::with_capacity(specs.len());
        for spec in specs {
            let spec = spec.normalized()?;
            if !seen.insert(spec.name.clone()) {
                return Err(ModelError::DuplicateCodebookEntry(spec.name));
            }
            columns.push(spec);
        }
        Ok(Self { columns })
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoking() -> ColumnSpec {
        ColumnSpec::categorical("cgtsmke")
            .with_value("1", "I smoke daily")
            .with_value("5", "I have never smoked")
            .with_missing("7")
            .with_missing("8")
    }

    #[test]
    fn test_column_kind_from_str() {
        assert_eq!(
            "Identifier".parse::<ColumnKind>().unwrap(),
            ColumnKind::Identifier
        );
        assert_eq!("num".parse::<ColumnKind>().unwrap(), ColumnKind::Numeric);
        assert!("text".parse::<ColumnKind>().is_err());
    }

    #[test]
    fn decode_categorical_uses_value_labels() {
        let codebook = Codebook::new(vec![smoking()]).unwrap();
        let spec = codebook.get("cgtsmke").unwrap();
        assert_eq!(
            spec.decode(Some("5.0")).unwrap(),
            CellValue::Category(Category::new("5", "I have never smoked"))
        );
        assert_eq!(spec.decode(Some("7")).unwrap(), CellValue::Missing);
        assert_eq!(spec.decode(None).unwrap(), CellValue::Missing);
        assert!(matches!(
            spec.decode(Some("3")),
            Err(ModelError::UnknownCode { .. })
        ));
    }

    #[test]
    fn decode_numeric_honours_missing_codes() {
        let spec = Codebook::new(vec![ColumnSpec::numeric("agea").with_missing("999")])
            .unwrap()
            .get("agea")
            .cloned()
            .unwrap();
        assert_eq!(spec.decode(Some("42")).unwrap(), CellValue::Number(42.0));
        assert_eq!(spec.decode(Some("999")).unwrap(), CellValue::Missing);
        assert_eq!(spec.decode(Some("")).unwrap(), CellValue::Missing);
        assert!(matches!(
            spec.decode(Some("forty")),
            Err(ModelError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn decode_identifier_requires_integer() {
        let spec = ColumnSpec::identifier("idno");
        assert_eq!(spec.decode(Some("1001")).unwrap(), CellValue::Id(1001));
        assert_eq!(spec.decode(Some("1001.0")).unwrap(), CellValue::Id(1001));
        assert!(matches!(
            spec.decode(None),
            Err(ModelError::MissingIdentifier { .. })
        ));
        assert!(matches!(
            spec.decode(Some("10.5")),
            Err(ModelError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn codebook_rejects_duplicates_and_unlabelled_categories() {
        let duplicate = Codebook::new(vec![ColumnSpec::numeric("a"), ColumnSpec::numeric("a")]);
        assert!(matches!(
            duplicate,
            Err(ModelError::DuplicateCodebookEntry(name)) if name == "a"
        ));

        let unlabelled = Codebook::new(vec![ColumnSpec::categorical("gndr")]);
        assert!(matches!(
            unlabelled,
            Err(ModelError::InvalidColumnSpec { .. })
        ));

        let labelled_id = Codebook::new(vec![ColumnSpec::identifier("idno").with_value("1", "x")]);
        assert!(labelled_id.is_err());
    }

    #[test]
    fn codebook_normalises_codes() {
        let codebook =
            Codebook::new(vec![ColumnSpec::categorical("x").with_value("1.0", "One")]).unwrap();
        assert_eq!(codebook.get("x").unwrap().value_label("1"), Some("One"));
    }
}

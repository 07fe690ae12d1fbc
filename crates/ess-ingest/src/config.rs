//! Study configuration.
//!
//! One TOML file names the three source extracts, the ordered column
//! selection of each, the role every pipeline-relevant column plays and the
//! codebook that types them.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use ess_model::{Codebook, ColumnKind, ColumnSpec};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

pub const DEFAULT_COUNTRY: &str = "United Kingdom";
pub const DEFAULT_COMPLETE_INTERVIEW: &str = "Complete and valid interview related to CF";

/// The three source tables of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Sample design data: PSU and inclusion probability.
    Sample,
    /// Contact-form paradata: one row per sampled unit.
    Paradata,
    /// Main questionnaire: one row per interviewed unit.
    Responses,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Sample, TableKind::Paradata, TableKind::Responses];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Sample => "sample",
            TableKind::Paradata => "paradata",
            TableKind::Responses => "responses",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One source extract and its ordered column selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub columns: Vec<String>,
    /// CSV only: 2 when a label row precedes the column-name row.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>, columns: &[&str]) -> Self {
        Self {
            path: path.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            header_rows: default_header_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sources {
    pub sample: SourceConfig,
    pub paradata: SourceConfig,
    pub responses: SourceConfig,
}

impl Sources {
    pub fn get(&self, kind: TableKind) -> &SourceConfig {
        match kind {
            TableKind::Sample => &self.sample,
            TableKind::Paradata => &self.paradata,
            TableKind::Responses => &self.responses,
        }
    }
}

/// Columns that carry the fields the merger and recoder read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Roles {
    pub outcome: String,
    pub psu: String,
    pub inclusion_probability: String,
    pub smoking_status: String,
    pub cigarettes_per_day: String,
    pub alcohol_frequency: String,
    pub alcohol_weekday: String,
    pub alcohol_weekend: String,
}

/// A role binding: role name, column, owning table and accepted kinds.
#[derive(Debug, Clone, Copy)]
pub struct RoleBinding<'a> {
    pub role: &'static str,
    pub column: &'a str,
    pub table: TableKind,
    pub kinds: &'static [ColumnKind],
}

const NUMERIC: &[ColumnKind] = &[ColumnKind::Numeric];
const CATEGORICAL: &[ColumnKind] = &[ColumnKind::Categorical];
const INTEGER: &[ColumnKind] = &[ColumnKind::Numeric, ColumnKind::Identifier];

impl<'a> RoleBinding<'a> {
    fn new(
        role: &'static str,
        column: &'a str,
        table: TableKind,
        kinds: &'static [ColumnKind],
    ) -> Self {
        Self {
            role,
            column,
            table,
            kinds,
        }
    }
}

impl Roles {
    pub fn bindings(&self) -> [RoleBinding<'_>; 8] {
        use TableKind::{Paradata, Responses, Sample};
        [
            RoleBinding::new("outcome", &self.outcome, Paradata, CATEGORICAL),
            RoleBinding::new("psu", &self.psu, Sample, INTEGER),
            RoleBinding::new(
                "inclusion_probability",
                &self.inclusion_probability,
                Sample,
                NUMERIC,
            ),
            RoleBinding::new("smoking_status", &self.smoking_status, Responses, CATEGORICAL),
            RoleBinding::new(
                "cigarettes_per_day",
                &self.cigarettes_per_day,
                Responses,
                NUMERIC,
            ),
            RoleBinding::new(
                "alcohol_frequency",
                &self.alcohol_frequency,
                Responses,
                CATEGORICAL,
            ),
            RoleBinding::new("alcohol_weekday", &self.alcohol_weekday, Responses, NUMERIC),
            RoleBinding::new("alcohol_weekend", &self.alcohol_weekend, Responses, NUMERIC),
        ]
    }
}

/// Parsed study configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Display label (or stored code) of the country to keep.
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_country_column")]
    pub country_column: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Contact-outcome label of a completed interview.
    #[serde(default = "default_complete_interview")]
    pub complete_interview: String,
    pub sources: Sources,
    pub roles: Roles,
    #[serde(default)]
    pub codebook: Vec<ColumnSpec>,
    /// Directory relative source paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_header_rows() -> usize {
    1
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_country_column() -> String {
    "cntry".to_string()
}

fn default_id_column() -> String {
    "idno".to_string()
}

fn default_complete_interview() -> String {
    DEFAULT_COMPLETE_INTERVIEW.to_string()
}

/// Read, parse and validate a study configuration file.
pub fn load_config(path: &Path) -> Result<StudyConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let mut config = parse_config(&text, path)?;
    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    config.validate()?;
    tracing::debug!(
        path = %path.display(),
        codebook = config.codebook.len(),
        "Loaded study configuration"
    );
    Ok(config)
}

/// Parse configuration text. `origin` is only used in error messages.
pub fn parse_config(text: &str, origin: &Path) -> Result<StudyConfig> {
    toml::from_str(text).map_err(|e| IngestError::ConfigParse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

impl StudyConfig {
    /// Build the validated codebook.
    pub fn codebook(&self) -> Result<Codebook> {
        Ok(Codebook::new(self.codebook.clone())?)
    }

    /// Cross-check selections, roles and codebook.
    pub fn validate(&self) -> Result<()> {
        let codebook = self.codebook()?;

        if self.country.trim().is_empty() {
            return Err(IngestError::invalid_config("country must not be blank"));
        }
        match codebook.get(&self.id_column).map(|spec| spec.kind) {
            Some(ColumnKind::Identifier) => {}
            Some(kind) => {
                return Err(IngestError::invalid_config(format!(
                    "id column '{}' is declared {kind}, expected identifier",
                    self.id_column
                )));
            }
            None => {
                return Err(IngestError::invalid_config(format!(
                    "id column '{}' has no codebook entry",
                    self.id_column
                )));
            }
        }
        match codebook.get(&self.country_column).map(|spec| spec.kind) {
            Some(ColumnKind::Categorical) => {}
            _ => {
                return Err(IngestError::invalid_config(format!(
                    "country column '{}' must be declared categorical",
                    self.country_column
                )));
            }
        }

        for kind in TableKind::ALL {
            let source = self.sources.get(kind);
            if !matches!(source.header_rows, 1 | 2) {
                return Err(IngestError::invalid_config(format!(
                    "{kind}: header_rows must be 1 or 2"
                )));
            }
            let mut seen = BTreeSet::new();
            for column in &source.columns {
                if !seen.insert(column.as_str()) {
                    return Err(IngestError::invalid_config(format!(
                        "{kind}: column '{column}' is selected twice"
                    )));
                }
                if !codebook.contains(column) {
                    return Err(IngestError::invalid_config(format!(
                        "{kind}: selected column '{column}' has no codebook entry"
                    )));
                }
            }
            for required in [&self.id_column, &self.country_column] {
                if !seen.contains(required.as_str()) {
                    return Err(IngestError::invalid_config(format!(
                        "{kind}: selection must include '{required}'"
                    )));
                }
            }
        }

        for binding in self.roles.bindings() {
            if !self
                .sources
                .get(binding.table)
                .columns
                .iter()
                .any(|column| column == binding.column)
            {
                return Err(IngestError::invalid_config(format!(
                    "role {} column '{}' is not selected from the {} table",
                    binding.role, binding.column, binding.table
                )));
            }
            let declared = codebook.get(binding.column).map(|spec| spec.kind);
            if !declared.is_some_and(|kind| binding.kinds.contains(&kind)) {
                return Err(IngestError::invalid_config(format!(
                    "role {} column '{}' must be declared {}",
                    binding.role,
                    binding.column,
                    binding
                        .kinds
                        .iter()
                        .map(ColumnKind::as_str)
                        .collect::<Vec<_>>()
                        .join(" or ")
                )));
            }
        }
        Ok(())
    }

    /// Resolve a source path against `data_dir`, else the config directory.
    pub fn source_path(&self, kind: TableKind, data_dir: Option<&Path>) -> PathBuf {
        let path = &self.sources.get(kind).path;
        if path.is_absolute() {
            return path.clone();
        }
        data_dir.unwrap_or(&self.base_dir).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[sources.sample]
path = "sddf.csv"
columns = ["idno", "cntry", "psu", "prob"]

[sources.paradata]
path = "contact.csv"
columns = ["idno", "cntry", "outnic"]

[sources.responses]
path = "main.csv"
columns = ["idno", "cntry", "cgtsmke", "cgtsday", "alcfreq", "alcwkdy", "alcwknd"]

[roles]
outcome = "outnic"
psu = "psu"
inclusion_probability = "prob"
smoking_status = "cgtsmke"
cigarettes_per_day = "cgtsday"
alcohol_frequency = "alcfreq"
alcohol_weekday = "alcwkdy"
alcohol_weekend = "alcwknd"

[[codebook]]
name = "idno"
kind = "identifier"

[[codebook]]
name = "cntry"
kind = "categorical"
values = { GB = "United Kingdom" }

[[codebook]]
name = "psu"
kind = "numeric"

[[codebook]]
name = "prob"
kind = "numeric"

[[codebook]]
name = "outnic"
kind = "categorical"
values = { 1 = "Complete and valid interview related to CF" }

[[codebook]]
name = "cgtsmke"
kind = "categorical"
values = { 1 = "I smoke daily" }

[[codebook]]
name = "cgtsday"
kind = "numeric"

[[codebook]]
name = "alcfreq"
kind = "categorical"
values = { 1 = "Every day" }

[[codebook]]
name = "alcwkdy"
kind = "numeric"

[[codebook]]
name = "alcwknd"
kind = "numeric"
"#;

    fn parse(text: &str) -> Result<StudyConfig> {
        parse_config(text, Path::new("study.toml"))
    }

    #[test]
    fn defaults_are_applied() {
        let config = parse(CONFIG).unwrap();
        assert_eq!(config.country, DEFAULT_COUNTRY);
        assert_eq!(config.country_column, "cntry");
        assert_eq!(config.id_column, "idno");
        assert_eq!(config.complete_interview, DEFAULT_COMPLETE_INTERVIEW);
        assert_eq!(config.sources.sample.header_rows, 1);
        config.validate().unwrap();
    }

    #[test]
    fn role_outside_its_selection_is_rejected() {
        let text = CONFIG.replace(
            r#"columns = ["idno", "cntry", "outnic"]"#,
            r#"columns = ["idno", "cntry"]"#,
        );
        let err = parse(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("role outcome"));
    }

    #[test]
    fn undeclared_column_is_rejected() {
        let text = CONFIG.replace(r#""psu", "prob"]"#, r#""psu", "prob", "dweight"]"#);
        let err = parse(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("'dweight' has no codebook entry"));
    }

    #[test]
    fn id_column_required_in_every_selection() {
        let text = CONFIG.replace(
            r#"columns = ["idno", "cntry", "outnic"]"#,
            r#"columns = ["cntry", "outnic"]"#,
        );
        let err = parse(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("paradata: selection must include 'idno'"));
    }

    #[test]
    fn role_kind_is_checked() {
        let text = CONFIG.replace(
            "name = \"alcwkdy\"\nkind = \"numeric\"",
            "name = \"alcwkdy\"\nkind = \"categorical\"\nvalues = { 1 = \"One\" }",
        );
        let err = parse(&text).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("must be declared numeric"));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let text = format!("colour = \"blue\"\n{CONFIG}");
        assert!(matches!(parse(&text), Err(IngestError::ConfigParse { .. })));
    }

    #[test]
    fn source_paths_resolve_against_data_dir_then_base_dir() {
        let mut config = parse(CONFIG).unwrap();
        config.base_dir = PathBuf::from("/studies/ess7");
        assert_eq!(
            config.source_path(TableKind::Sample, None),
            PathBuf::from("/studies/ess7/sddf.csv")
        );
        assert_eq!(
            config.source_path(TableKind::Sample, Some(Path::new("/data"))),
            PathBuf::from("/data/sddf.csv")
        );
    }
}

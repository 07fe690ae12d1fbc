//! Descriptive summaries of the prepared study.

use ess_model::{ColumnMeta, MergedUnit, ResponseStatus};
use ess_transform::{DerivedColumn, MergeStats, MergedTable, RecodeStats};
use serde::Serialize;

/// Rows × columns of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDimensions {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl TableDimensions {
    pub fn new(name: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            columns,
        }
    }
}

/// Respondents and non-respondents. Every unit is in exactly one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResponsePartition {
    pub respondents: usize,
    pub non_respondents: usize,
}

impl ResponsePartition {
    pub fn total(&self) -> usize {
        self.respondents + self.non_respondents
    }

    /// Share of respondents, `None` for an empty table.
    pub fn response_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.respondents as f64 / total as f64)
    }
}

/// Partition units by whether their contact outcome is `complete_interview`.
pub fn response_partition(units: &[MergedUnit], complete_interview: &str) -> ResponsePartition {
    units
        .iter()
        .fold(ResponsePartition::default(), |mut partition, unit| {
            match unit.response_status(complete_interview) {
                ResponseStatus::Respondent => partition.respondents += 1,
                ResponseStatus::NonRespondent => partition.non_respondents += 1,
            }
            partition
        })
}

/// Units with a value, mean, min and max of one derived outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSummary {
    pub name: String,
    pub label: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn outcome_summaries(table: &MergedTable) -> Vec<OutcomeSummary> {
    DerivedColumn::ALL
        .into_iter()
        .map(|derived| {
            let values: Vec<f64> = table
                .units
                .iter()
                .filter_map(|unit| match derived {
                    DerivedColumn::CigarettesPerDay => {
                        unit.derived.cigarettes_per_day.map(f64::from)
                    }
                    DerivedColumn::AlcoholGramsPerDay => unit.derived.alcohol_grams_per_day,
                })
                .collect();
            describe(derived, &values)
        })
        .collect()
}

fn describe(derived: DerivedColumn, values: &[f64]) -> OutcomeSummary {
    let count = values.len();
    let (mean, min, max) = if count == 0 {
        (None, None, None)
    } else {
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (Some(sum / count as f64), Some(min), Some(max))
    };
    OutcomeSummary {
        name: derived.name().to_string(),
        label: derived.label().to_string(),
        count,
        mean,
        min,
        max,
    }
}

/// Name and label of every column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableListing {
    pub table: String,
    pub variables: Vec<VariableEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableEntry {
    pub name: String,
    pub label: String,
}

impl VariableListing {
    pub fn from_columns<'a>(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = &'a ColumnMeta>,
    ) -> Self {
        Self {
            table: table.into(),
            variables: columns
                .into_iter()
                .map(|meta| VariableEntry {
                    name: meta.name.clone(),
                    label: meta.label.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Everything the report prints, in serialisable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySummary {
    pub country: String,
    pub complete_interview: String,
    pub tables: Vec<TableDimensions>,
    pub partition: ResponsePartition,
    pub merge: MergeStats,
    pub recode: RecodeStats,
    pub outcomes: Vec<OutcomeSummary>,
    pub variables: Vec<VariableListing>,
}

/// Inputs of [`StudySummary::build`] besides the merged table.
#[derive(Debug, Clone)]
pub struct SummaryInputs {
    pub country: String,
    pub complete_interview: String,
    /// Dimensions and listings of the selected source tables, in order.
    pub sources: Vec<(TableDimensions, VariableListing)>,
    pub merge: MergeStats,
    pub recode: RecodeStats,
}

impl StudySummary {
    pub fn build(inputs: SummaryInputs, merged: &MergedTable) -> Self {
        let (mut tables, mut variables): (Vec<_>, Vec<_>) = inputs.sources.into_iter().unzip();
        tables.push(TableDimensions::new("merged", merged.height(), merged.width()));
        variables.push(VariableListing::from_columns("merged", merged.column_metas()));
        Self {
            partition: response_partition(&merged.units, &inputs.complete_interview),
            country: inputs.country,
            complete_interview: inputs.complete_interview,
            tables,
            merge: inputs.merge,
            recode: inputs.recode,
            outcomes: outcome_summaries(merged),
            variables,
        }
    }

    pub fn merged_variables(&self) -> Option<&VariableListing> {
        self.variables.iter().find(|listing| listing.table == "merged")
    }
}

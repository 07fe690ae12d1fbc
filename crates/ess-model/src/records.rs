//! Per-unit records of the three source tables and their merge.
//!
//! Every record keeps its full row of decoded cells (aligned with the
//! columns of its table) next to the typed fields the pipeline reads.

use serde::{Deserialize, Serialize};

use crate::categories::{AlcoholFrequency, ResponseStatus, SmokingStatus};
use crate::ids::UnitId;
use crate::value::{Category, CellValue};

/// A record keyed by unit identifier.
pub trait UnitRecord {
    fn idno(&self) -> UnitId;
    fn cells(&self) -> &[CellValue];
}

/// Sampling metadata for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub idno: UnitId,
    pub psu: Option<i64>,
    pub inclusion_probability: Option<f64>,
    pub cells: Vec<CellValue>,
}

/// Fieldwork metadata for one unit. Present for every sampled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParadataRecord {
    pub idno: UnitId,
    pub outcome: Option<Category>,
    pub cells: Vec<CellValue>,
}

impl ParadataRecord {
    /// Respondent iff the contact outcome label equals `complete_interview`.
    /// An unset outcome is a non-respondent.
    pub fn response_status(&self, complete_interview: &str) -> ResponseStatus {
        match &self.outcome {
            Some(outcome) if outcome.label.trim() == complete_interview.trim() => {
                ResponseStatus::Respondent
            }
            _ => ResponseStatus::NonRespondent,
        }
    }
}

/// Questionnaire answers of one interviewed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub idno: UnitId,
    pub smoking_status: Option<SmokingStatus>,
    pub cigarettes_per_day_raw: Option<u32>,
    pub alcohol_frequency: Option<AlcoholFrequency>,
    pub alcohol_weekday_qty: Option<f64>,
    pub alcohol_weekend_qty: Option<f64>,
    pub cells: Vec<CellValue>,
}

impl ResponseRecord {
    /// A response with every recoder input unset.
    pub fn empty(idno: UnitId) -> Self {
        Self {
            idno,
            smoking_status: None,
            cigarettes_per_day_raw: None,
            alcohol_frequency: None,
            alcohol_weekday_qty: None,
            alcohol_weekend_qty: None,
            cells: Vec::new(),
        }
    }
}

macro_rules! impl_unit_record {
    ($($ty:ty),+) => {
        $(impl UnitRecord for $ty {
            fn idno(&self) -> UnitId {
                self.idno
            }

            fn cells(&self) -> &[CellValue] {
                &self.cells
            }
        })+
    };
}

impl_unit_record!(SampleRecord, ParadataRecord, ResponseRecord);

/// Outcomes derived from the response fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedOutcomes {
    pub cigarettes_per_day: Option<u32>,
    pub alcohol_grams_per_day: Option<f64>,
}

/// One sampled unit after the merge: exactly one paradata record, and the
/// sample and response records when their tables had a row for the unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedUnit {
    pub paradata: ParadataRecord,
    pub sample: Option<SampleRecord>,
    pub response: Option<ResponseRecord>,
    pub derived: DerivedOutcomes,
}

impl MergedUnit {
    pub fn new(
        paradata: ParadataRecord,
        sample: Option<SampleRecord>,
        response: Option<ResponseRecord>,
    ) -> Self {
        Self {
            paradata,
            sample,
            response,
            derived: DerivedOutcomes::default(),
        }
    }

    pub fn idno(&self) -> UnitId {
        self.paradata.idno
    }

    pub fn response_status(&self, complete_interview: &str) -> ResponseStatus {
        self.paradata.response_status(complete_interview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paradata(outcome: Option<&str>) -> ParadataRecord {
        ParadataRecord {
            idno: UnitId::new(1),
            outcome: outcome.map(|label| Category::new("1", label)),
            cells: Vec::new(),
        }
    }

    #[test]
    fn response_status_matches_complete_label_only() {
        let complete = "Complete interview";
        assert_eq!(
            paradata(Some("Complete interview")).response_status(complete),
            ResponseStatus::Respondent
        );
        assert_eq!(
            paradata(Some("Refusal by respondent")).response_status(complete),
            ResponseStatus::NonRespondent
        );
        assert_eq!(
            paradata(None).response_status(complete),
            ResponseStatus::NonRespondent
        );
    }

    #[test]
    fn merged_unit_starts_without_outcomes() {
        let unit = MergedUnit::new(paradata(None), None, None);
        assert_eq!(unit.idno(), UnitId::new(1));
        assert_eq!(unit.derived, DerivedOutcomes::default());
    }
}

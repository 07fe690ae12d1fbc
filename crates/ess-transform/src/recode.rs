//! Recoder: derived smoking and drinking outcomes.
//!
//! Each rule is a pure function of one unit's response fields, so applying
//! them to a merged table does not depend on row order.

use ess_model::{AlcoholFrequency, DerivedOutcomes, MergedUnit, ResponseRecord, SmokingStatus};
use serde::Serialize;

use crate::merge::{ColumnOrigin, DerivedColumn, MergedColumn, MergedTable};

/// Cigarettes per day.
///
/// Anyone who does not currently smoke gets exactly 0. Everyone else keeps
/// the reported value, including an unset one.
pub fn recode_cigarettes(status: Option<SmokingStatus>, raw: Option<u32>) -> Option<u32> {
    match status {
        Some(status) if !status.is_current_smoker() => Some(0),
        _ => raw,
    }
}

/// Average daily quantity from a weekday and a weekend-day quantity.
pub fn daily_baseline(weekday: f64, weekend: f64) -> f64 {
    (weekday * 5.0 + weekend * 2.0) / 7.0
}

/// Alcohol grams per day.
///
/// An unset frequency gives an unset result. `Never` gives exactly 0
/// whatever the quantities; otherwise both quantities must be present.
pub fn recode_alcohol(
    frequency: Option<AlcoholFrequency>,
    weekday: Option<f64>,
    weekend: Option<f64>,
) -> Option<f64> {
    let divisor = match frequency? {
        AlcoholFrequency::Never => return Some(0.0),
        AlcoholFrequency::Daily => 1.0,
        AlcoholFrequency::SeveralTimesAWeek => 2.5,
        AlcoholFrequency::OnceAWeek => 7.0,
        AlcoholFrequency::TwoToThreeTimesAMonth => 10.0,
        AlcoholFrequency::OnceAMonth => 30.0,
        AlcoholFrequency::LessThanOnceAMonth => 50.0,
    };
    Some(daily_baseline(weekday?, weekend?) / divisor)
}

/// Outcomes for one unit. Units without a response get nothing derived.
pub fn derive_outcomes(response: Option<&ResponseRecord>) -> DerivedOutcomes {
    let Some(response) = response else {
        return DerivedOutcomes::default();
    };
    DerivedOutcomes {
        cigarettes_per_day: recode_cigarettes(
            response.smoking_status,
            response.cigarettes_per_day_raw,
        ),
        alcohol_grams_per_day: recode_alcohol(
            response.alcohol_frequency,
            response.alcohol_weekday_qty,
            response.alcohol_weekend_qty,
        ),
    }
}

/// How many units received each derived outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecodeStats {
    pub units: usize,
    pub cigarettes_set: usize,
    pub alcohol_set: usize,
}

pub fn recode_units(units: &mut [MergedUnit]) -> RecodeStats {
    let mut stats = RecodeStats {
        units: units.len(),
        ..RecodeStats::default()
    };
    for unit in units.iter_mut() {
        unit.derived = derive_outcomes(unit.response.as_ref());
        stats.cigarettes_set += usize::from(unit.derived.cigarettes_per_day.is_some());
        stats.alcohol_set += usize::from(unit.derived.alcohol_grams_per_day.is_some());
    }
    stats
}

/// Recode every unit and append the derived columns once.
pub fn recode_table(table: &mut MergedTable) -> RecodeStats {
    for derived in DerivedColumn::ALL {
        if !table.has_column(derived.name()) {
            table.columns.push(MergedColumn {
                meta: derived.meta(),
                origin: ColumnOrigin::Derived(derived),
            });
        }
    }
    let stats = recode_units(&mut table.units);
    tracing::debug!(
        units = stats.units,
        cigarettes = stats.cigarettes_set,
        alcohol = stats.alcohol_set,
        "Recoded outcomes"
    );
    stats
}

//! Property tests for the merge and recode invariants.

use ess_model::{
    AlcoholFrequency, Category, CellValue, ColumnKind, ColumnMeta, ParadataRecord,
    ResponseRecord, SampleRecord, SmokingStatus, SurveyTable, UnitId,
};
use ess_transform::{merge_tables, recode_alcohol, recode_cigarettes, recode_table};
use proptest::prelude::*;

fn smoking_status() -> impl Strategy<Value = SmokingStatus> {
    prop::sample::select(SmokingStatus::ALL.to_vec())
}

fn non_never_frequency() -> impl Strategy<Value = AlcoholFrequency> {
    prop::sample::select(vec![
        AlcoholFrequency::Daily,
        AlcoholFrequency::SeveralTimesAWeek,
        AlcoholFrequency::OnceAWeek,
        AlcoholFrequency::TwoToThreeTimesAMonth,
        AlcoholFrequency::OnceAMonth,
        AlcoholFrequency::LessThanOnceAMonth,
    ])
}

fn paradata(ids: &[i64], outcomes: &[Option<u8>]) -> SurveyTable<ParadataRecord> {
    let records = ids
        .iter()
        .zip(outcomes.iter().cycle())
        .map(|(id, outcome)| {
            let category = outcome.map(|code| Category::new(code.to_string(), "Outcome"));
            ParadataRecord {
                idno: UnitId::new(*id),
                cells: vec![
                    CellValue::Id(*id),
                    category.clone().map_or(CellValue::Missing, CellValue::Category),
                ],
                outcome: category,
            }
        })
        .collect();
    SurveyTable::new(
        "paradata",
        vec![
            ColumnMeta::new("idno", None, ColumnKind::Identifier),
            ColumnMeta::new("outnic", None, ColumnKind::Categorical),
        ],
    )
    .with_records(records)
}

fn sample(ids: &[i64]) -> SurveyTable<SampleRecord> {
    let records = ids
        .iter()
        .map(|id| SampleRecord {
            idno: UnitId::new(*id),
            psu: None,
            inclusion_probability: Some(0.5),
            cells: vec![CellValue::Id(*id)],
        })
        .collect();
    SurveyTable::new(
        "sample",
        vec![ColumnMeta::new("idno", None, ColumnKind::Identifier)],
    )
    .with_records(records)
}

fn responses(ids: &[i64]) -> SurveyTable<ResponseRecord> {
    let records = ids
        .iter()
        .map(|id| {
            let mut record = ResponseRecord::empty(UnitId::new(*id));
            record.smoking_status = Some(SmokingStatus::Never);
            record.cells = vec![CellValue::Id(*id)];
            record
        })
        .collect();
    SurveyTable::new(
        "responses",
        vec![ColumnMeta::new("idno", None, ColumnKind::Identifier)],
    )
    .with_records(records)
}

proptest! {
    #[test]
    fn non_current_smokers_always_zero(
        status in smoking_status().prop_filter("not current", |s| !s.is_current_smoker()),
        raw in proptest::option::of(0u32..200),
    ) {
        prop_assert_eq!(recode_cigarettes(Some(status), raw), Some(0));
    }

    #[test]
    fn current_smokers_keep_raw(
        status in smoking_status().prop_filter("current", SmokingStatus::is_current_smoker),
        raw in proptest::option::of(0u32..200),
    ) {
        prop_assert_eq!(recode_cigarettes(Some(status), raw), raw);
        prop_assert_eq!(recode_cigarettes(None, raw), raw);
    }

    #[test]
    fn never_drinkers_always_zero(
        weekday in proptest::option::of(0.0f64..500.0),
        weekend in proptest::option::of(0.0f64..500.0),
    ) {
        prop_assert_eq!(
            recode_alcohol(Some(AlcoholFrequency::Never), weekday, weekend),
            Some(0.0)
        );
    }

    #[test]
    fn alcohol_is_non_negative_and_unset_without_quantities(
        frequency in non_never_frequency(),
        weekday in 0.0f64..500.0,
        weekend in 0.0f64..500.0,
    ) {
        let value = recode_alcohol(Some(frequency), Some(weekday), Some(weekend));
        prop_assert!(value.is_some_and(|v| v >= 0.0));
        prop_assert_eq!(recode_alcohol(Some(frequency), None, Some(weekend)), None);
        prop_assert_eq!(recode_alcohol(Some(frequency), Some(weekday), None), None);
    }

    #[test]
    fn merge_keeps_one_row_per_anchor(
        anchor_ids in prop::collection::vec(0i64..60, 0..40),
        outcomes in prop::collection::vec(proptest::option::of(1u8..12), 1..5),
        sample_ids in prop::collection::btree_set(0i64..80, 0..40),
        response_ids in prop::collection::btree_set(0i64..80, 0..40),
    ) {
        let sample_ids: Vec<i64> = sample_ids.into_iter().collect();
        let response_ids: Vec<i64> = response_ids.into_iter().collect();
        let (mut merged, stats) = merge_tables(
            paradata(&anchor_ids, &outcomes),
            sample(&sample_ids),
            responses(&response_ids),
        )
        .unwrap();
        recode_table(&mut merged);

        prop_assert_eq!(merged.height(), anchor_ids.len());
        prop_assert_eq!(stats.units, anchor_ids.len());

        let mut expected = anchor_ids.clone();
        let mut actual: Vec<i64> = merged.units.iter().map(|u| u.idno().get()).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);

        for unit in &merged.units {
            let id = unit.idno().get();
            prop_assert_eq!(unit.sample.is_some(), sample_ids.contains(&id));
            prop_assert_eq!(unit.response.is_some(), response_ids.contains(&id));
            // Responding never-smokers always recode to zero.
            if unit.response.is_some() {
                prop_assert_eq!(unit.derived.cigarettes_per_day, Some(0));
            } else {
                prop_assert_eq!(unit.derived.cigarettes_per_day, None);
            }
        }

        // Outcome codes are non-decreasing, unset last.
        let codes: Vec<Option<u8>> = merged
            .units
            .iter()
            .map(|u| u.paradata.outcome.as_ref().map(|c| c.code.parse().unwrap()))
            .collect();
        let mut sorted = codes.clone();
        sorted.sort_by_key(|code| (code.is_none(), *code));
        prop_assert_eq!(codes, sorted);
    }
}

#[test]
fn empty_right_hand_tables_keep_every_anchor() {
    let (merged, stats) = merge_tables(
        paradata(&[3, 1, 2], &[Some(2), None, Some(1)]),
        sample(&[]),
        responses(&[]),
    )
    .unwrap();
    assert_eq!(merged.height(), 3);
    assert_eq!(stats.with_sample, 0);
    assert_eq!(
        merged
            .units
            .iter()
            .map(|u| u.idno().get())
            .collect::<Vec<_>>(),
        vec![2, 3, 1]
    );
}

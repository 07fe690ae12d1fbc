//! Merger: one row per sampled unit.
//!
//! The contact-form table is the anchor. Sample design and questionnaire
//! records attach by `idno` as left joins, so a unit without a sample or
//! response row keeps its row with those fields unset.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use ess_model::{
    CellValue, ColumnKind, ColumnMeta, MergedUnit, ParadataRecord, ResponseRecord, SampleRecord,
    SurveyTable, UnitId, UnitRecord, normalize_code,
};
use serde::Serialize;

use crate::error::{Result, TransformError};

/// Outcomes computed by the recoder and exposed as extra columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedColumn {
    CigarettesPerDay,
    AlcoholGramsPerDay,
}

impl DerivedColumn {
    pub const ALL: [DerivedColumn; 2] = [
        DerivedColumn::CigarettesPerDay,
        DerivedColumn::AlcoholGramsPerDay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DerivedColumn::CigarettesPerDay => "cigarettes_per_day",
            DerivedColumn::AlcoholGramsPerDay => "alcohol_grams_per_day",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DerivedColumn::CigarettesPerDay => "Cigarettes smoked per day",
            DerivedColumn::AlcoholGramsPerDay => "Alcohol consumption (grams per day)",
        }
    }

    pub fn meta(&self) -> ColumnMeta {
        ColumnMeta::new(
            self.name(),
            Some(self.label().to_string()),
            ColumnKind::Numeric,
        )
    }
}

/// Where the cells of a merged column come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "table", content = "position", rename_all = "snake_case")]
pub enum ColumnOrigin {
    Paradata(usize),
    Sample(usize),
    Responses(usize),
    Derived(DerivedColumn),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedColumn {
    pub meta: ColumnMeta,
    pub origin: ColumnOrigin,
}

impl MergedColumn {
    pub fn name(&self) -> &str {
        &self.meta.name
    }
}

/// The unit-of-analysis table.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub columns: Vec<MergedColumn>,
    pub units: Vec<MergedUnit>,
}

impl MergedTable {
    pub fn height(&self) -> usize {
        self.units.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&MergedColumn> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_metas(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().map(|column| &column.meta)
    }

    /// Cell of `unit` in `column`. Absent records read as missing.
    pub fn cell(&self, unit: &MergedUnit, column: &MergedColumn) -> CellValue {
        let from = |cells: &[CellValue], position: usize| {
            cells.get(position).cloned().unwrap_or(CellValue::Missing)
        };
        match column.origin {
            ColumnOrigin::Paradata(position) => from(&unit.paradata.cells, position),
            ColumnOrigin::Sample(position) => unit
                .sample
                .as_ref()
                .map_or(CellValue::Missing, |record| from(&record.cells, position)),
            ColumnOrigin::Responses(position) => unit
                .response
                .as_ref()
                .map_or(CellValue::Missing, |record| from(&record.cells, position)),
            ColumnOrigin::Derived(DerivedColumn::CigarettesPerDay) => unit
                .derived
                .cigarettes_per_day
                .map_or(CellValue::Missing, |value| CellValue::Number(f64::from(value))),
            ColumnOrigin::Derived(DerivedColumn::AlcoholGramsPerDay) => unit
                .derived
                .alcohol_grams_per_day
                .map_or(CellValue::Missing, CellValue::Number),
        }
    }
}

/// Counters reported by [`merge_tables`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub units: usize,
    pub with_sample: usize,
    pub with_response: usize,
    /// Right-hand rows whose `idno` has no contact-form row.
    pub orphan_sample: usize,
    pub orphan_responses: usize,
}

/// Left-join paradata with sample data, then with responses, on `idno`.
///
/// The result has exactly one row per paradata row and is stably sorted by
/// contact outcome. Duplicate keys in a right-hand table are an error.
pub fn merge_tables(
    paradata: SurveyTable<ParadataRecord>,
    sample: SurveyTable<SampleRecord>,
    responses: SurveyTable<ResponseRecord>,
) -> Result<(MergedTable, MergeStats)> {
    let mut columns: Vec<MergedColumn> = paradata
        .columns
        .iter()
        .enumerate()
        .map(|(position, meta)| MergedColumn {
            meta: meta.clone(),
            origin: ColumnOrigin::Paradata(position),
        })
        .collect();
    append_columns(&mut columns, &sample.columns, ColumnOrigin::Sample);
    append_columns(&mut columns, &responses.columns, ColumnOrigin::Responses);

    let sample_by_id = index_by_id(&sample.name, sample.records)?;
    let responses_by_id = index_by_id(&responses.name, responses.records)?;

    let mut seen = HashSet::with_capacity(paradata.records.len());
    let mut duplicate_anchors = 0usize;
    let mut stats = MergeStats::default();
    let mut units = Vec::with_capacity(paradata.records.len());
    for record in paradata.records {
        if !seen.insert(record.idno) {
            duplicate_anchors += 1;
        }
        let sample = sample_by_id.get(&record.idno).cloned();
        let response = responses_by_id.get(&record.idno).cloned();
        stats.with_sample += usize::from(sample.is_some());
        stats.with_response += usize::from(response.is_some());
        units.push(MergedUnit::new(record, sample, response));
    }
    stats.units = units.len();
    stats.orphan_sample = sample_by_id.keys().filter(|id| !seen.contains(*id)).count();
    stats.orphan_responses = responses_by_id
        .keys()
        .filter(|id| !seen.contains(*id))
        .count();

    if duplicate_anchors > 0 {
        tracing::warn!(
            table = %paradata.name,
            duplicates = duplicate_anchors,
            "Anchor table repeats idno values; each row is kept"
        );
    }
    let unmatched = stats.units - stats.with_sample;
    if unmatched > 0 {
        tracing::warn!(units = unmatched, "Units without a sample design record");
    }
    if stats.orphan_sample + stats.orphan_responses > 0 {
        tracing::warn!(
            sample = stats.orphan_sample,
            responses = stats.orphan_responses,
            "Rows without a contact-form record are not carried into the merge"
        );
    }

    sort_by_outcome(&mut units);
    tracing::debug!(
        units = stats.units,
        with_sample = stats.with_sample,
        with_response = stats.with_response,
        columns = columns.len(),
        "Merged tables"
    );
    Ok((MergedTable { columns, units }, stats))
}

/// Append right-hand columns, skipping names the merged table already has.
fn append_columns(
    columns: &mut Vec<MergedColumn>,
    incoming: &[ColumnMeta],
    origin: fn(usize) -> ColumnOrigin,
) {
    for (position, meta) in incoming.iter().enumerate() {
        if columns.iter().any(|column| column.meta.name == meta.name) {
            continue;
        }
        columns.push(MergedColumn {
            meta: meta.clone(),
            origin: origin(position),
        });
    }
}

fn index_by_id<R: UnitRecord>(table: &str, records: Vec<R>) -> Result<HashMap<UnitId, R>> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let idno = record.idno();
        if index.insert(idno, record).is_some() {
            return Err(TransformError::DuplicateKey {
                table: table.to_string(),
                idno: idno.get(),
            });
        }
    }
    Ok(index)
}

/// Sort key of a contact outcome.
#[derive(Debug, Clone, PartialEq)]
enum OutcomeKey {
    Numeric(f64),
    Text(String),
    Unset,
}

impl OutcomeKey {
    fn of(unit: &MergedUnit) -> Self {
        match &unit.paradata.outcome {
            None => OutcomeKey::Unset,
            Some(category) => {
                let code = normalize_code(&category.code);
                match code.parse::<f64>() {
                    Ok(value) if value.is_finite() => OutcomeKey::Numeric(value),
                    _ => OutcomeKey::Text(code),
                }
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OutcomeKey::Numeric(_) => 0,
            OutcomeKey::Text(_) => 1,
            OutcomeKey::Unset => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OutcomeKey::Numeric(a), OutcomeKey::Numeric(b)) => a.total_cmp(b),
            (OutcomeKey::Text(a), OutcomeKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort by contact-outcome code: numeric codes numerically, then
/// text codes lexically, then units without an outcome.
pub fn sort_by_outcome(units: &mut [MergedUnit]) {
    units.sort_by_cached_key(|unit| SortKey(OutcomeKey::of(unit)));
}

#[derive(Debug, Clone, PartialEq)]
struct SortKey(OutcomeKey);

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.compare(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_model::Category;

    fn paradata(rows: &[(i64, Option<&str>)]) -> SurveyTable<ParadataRecord> {
        let columns = vec![
            ColumnMeta::new("idno", None, ColumnKind::Identifier),
            ColumnMeta::new("cntry", None, ColumnKind::Categorical),
            ColumnMeta::new("outnic", None, ColumnKind::Categorical),
        ];
        let records = rows
            .iter()
            .map(|(id, code)| ParadataRecord {
                idno: UnitId::new(*id),
                outcome: code.map(|code| Category::new(code, format!("Outcome {code}"))),
                cells: vec![
                    CellValue::Id(*id),
                    CellValue::Category(Category::new("GB", "United Kingdom")),
                    code.map_or(CellValue::Missing, |code| {
                        CellValue::Category(Category::new(code, format!("Outcome {code}")))
                    }),
                ],
            })
            .collect();
        SurveyTable::new("paradata", columns).with_records(records)
    }

    fn sample(ids: &[i64]) -> SurveyTable<SampleRecord> {
        let columns = vec![
            ColumnMeta::new("idno", None, ColumnKind::Identifier),
            ColumnMeta::new("cntry", None, ColumnKind::Categorical),
            ColumnMeta::new("psu", None, ColumnKind::Numeric),
        ];
        let records = ids
            .iter()
            .map(|id| SampleRecord {
                idno: UnitId::new(*id),
                psu: Some(*id * 10),
                inclusion_probability: None,
                cells: vec![
                    CellValue::Id(*id),
                    CellValue::Category(Category::new("GB", "United Kingdom")),
                    CellValue::Number((*id * 10) as f64),
                ],
            })
            .collect();
        SurveyTable::new("sample", columns).with_records(records)
    }

    fn responses(ids: &[i64]) -> SurveyTable<ResponseRecord> {
        let columns = vec![ColumnMeta::new("idno", None, ColumnKind::Identifier)];
        let records = ids
            .iter()
            .map(|id| {
                let mut record = ResponseRecord::empty(UnitId::new(*id));
                record.cells = vec![CellValue::Id(*id)];
                record
            })
            .collect();
        SurveyTable::new("responses", columns).with_records(records)
    }

    fn ids(table: &MergedTable) -> Vec<i64> {
        table.units.iter().map(|unit| unit.idno().get()).collect()
    }

    #[test]
    fn left_join_keeps_every_anchor_row() {
        let (merged, stats) = merge_tables(
            paradata(&[(1, Some("1")), (2, Some("3")), (3, None)]),
            sample(&[1, 2, 9]),
            responses(&[1]),
        )
        .unwrap();
        assert_eq!(merged.height(), 3);
        assert_eq!(stats.with_sample, 2);
        assert_eq!(stats.with_response, 1);
        assert_eq!(stats.orphan_sample, 1);
        assert!(merged.units[2].sample.is_none());
        assert!(merged.units[1].response.is_none());
    }

    #[test]
    fn shared_columns_are_not_duplicated() {
        let (merged, _) =
            merge_tables(paradata(&[(1, None)]), sample(&[1]), responses(&[1])).unwrap();
        let names: Vec<&str> = merged.columns.iter().map(MergedColumn::name).collect();
        assert_eq!(names, vec!["idno", "cntry", "outnic", "psu"]);
        assert_eq!(merged.column("psu").unwrap().origin, ColumnOrigin::Sample(2));
    }

    #[test]
    fn cells_resolve_through_origins() {
        let (merged, _) =
            merge_tables(paradata(&[(1, None), (2, None)]), sample(&[2]), responses(&[])).unwrap();
        let psu = merged.column("psu").unwrap();
        assert_eq!(merged.cell(&merged.units[0], psu), CellValue::Missing);
        assert_eq!(merged.cell(&merged.units[1], psu), CellValue::Number(20.0));
    }

    #[test]
    fn duplicate_right_hand_keys_fail() {
        let err = merge_tables(paradata(&[(1, None)]), sample(&[1]), responses(&[1, 5, 5]))
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::DuplicateKey { ref table, idno: 5 } if table == "responses"
        ));
    }

    #[test]
    fn sorted_by_outcome_code_numerically_and_stably() {
        let (merged, _) = merge_tables(
            paradata(&[
                (1, Some("10")),
                (2, None),
                (3, Some("2")),
                (4, Some("X")),
                (5, Some("2")),
                (6, Some("1.0")),
            ]),
            sample(&[]),
            responses(&[]),
        )
        .unwrap();
        assert_eq!(ids(&merged), vec![6, 3, 5, 1, 4, 2]);
    }
}

//! Typed extraction: raw text frames to codebook-checked records.

use ess_model::{
    AlcoholFrequency, CellValue, Codebook, ColumnMeta, ModelError, ParadataRecord,
    ResponseRecord, SampleRecord, SmokingStatus, SurveyTable, UnitId,
};

use crate::config::StudyConfig;
use crate::error::{IngestError, Result};
use crate::polars_utils::column_text;
use crate::reader::LabeledFrame;

/// A frame decoded cell by cell against the codebook.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub table: String,
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DecodedFrame {
    fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|meta| meta.name == column)
            .ok_or_else(|| IngestError::MissingColumns {
                table: self.table.clone(),
                columns: vec![column.to_string()],
            })
    }

    /// Row numbers in errors are 1-based data rows.
    fn decode_error(&self, row: usize, source: ModelError) -> IngestError {
        IngestError::Decode {
            table: self.table.clone(),
            row: row + 1,
            source,
        }
    }

    fn idno(&self, row: usize, cells: &[CellValue], id_pos: usize, column: &str) -> Result<UnitId> {
        cells[id_pos].as_id().map(UnitId::new).ok_or_else(|| {
            self.decode_error(
                row,
                ModelError::MissingIdentifier {
                    column: column.to_string(),
                },
            )
        })
    }

    fn whole_number(&self, row: usize, column: &str, value: f64) -> Result<i64> {
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Ok(value as i64)
        } else {
            Err(IngestError::InvalidCount {
                table: self.table.clone(),
                row: row + 1,
                column: column.to_string(),
                value,
            })
        }
    }

    fn count(&self, row: usize, column: &str, value: f64) -> Result<u32> {
        let whole = self.whole_number(row, column, value)?;
        u32::try_from(whole).map_err(|_| IngestError::InvalidCount {
            table: self.table.clone(),
            row: row + 1,
            column: column.to_string(),
            value,
        })
    }

    fn quantity(&self, row: usize, column: &str, value: Option<f64>) -> Result<Option<f64>> {
        match value {
            Some(value) if value < 0.0 => Err(IngestError::NegativeValue {
                table: self.table.clone(),
                row: row + 1,
                column: column.to_string(),
                value,
            }),
            other => Ok(other),
        }
    }

    fn into_table<R>(self, records: Vec<R>) -> SurveyTable<R> {
        SurveyTable::new(self.table, self.columns).with_records(records)
    }
}

/// Decode every cell of `frame`. Codebook labels take precedence over
/// labels stored in the file.
pub fn decode_frame(frame: &LabeledFrame, codebook: &Codebook) -> Result<DecodedFrame> {
    let mut columns = Vec::with_capacity(frame.width());
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::with_capacity(frame.width()); frame.height()];

    for name in frame.column_names() {
        let spec = codebook.get(&name).ok_or_else(|| {
            IngestError::invalid_config(format!(
                "{}: column '{name}' has no codebook entry",
                frame.name
            ))
        })?;
        for (idx, raw) in column_text(&frame.data, &name)?.into_iter().enumerate() {
            let cell = spec
                .decode(raw.as_deref())
                .map_err(|source| IngestError::Decode {
                    table: frame.name.clone(),
                    row: idx + 1,
                    source,
                })?;
            rows[idx].push(cell);
        }
        let label = spec
            .label
            .clone()
            .or_else(|| frame.label(&name).map(ToString::to_string));
        columns.push(ColumnMeta::new(name, label, spec.kind));
    }

    Ok(DecodedFrame {
        table: frame.name.clone(),
        columns,
        rows,
    })
}

/// Sample design records: PSU and inclusion probability.
pub fn extract_sample(
    frame: &LabeledFrame,
    config: &StudyConfig,
    codebook: &Codebook,
) -> Result<SurveyTable<SampleRecord>> {
    let decoded = decode_frame(frame, codebook)?;
    let id_pos = decoded.position(&config.id_column)?;
    let psu_pos = decoded.position(&config.roles.psu)?;
    let prob_pos = decoded.position(&config.roles.inclusion_probability)?;

    let mut records = Vec::with_capacity(decoded.rows.len());
    for (row, cells) in decoded.rows.iter().enumerate() {
        let psu = match cells[psu_pos].as_number() {
            Some(value) => Some(decoded.whole_number(row, &config.roles.psu, value)?),
            None => None,
        };
        records.push(SampleRecord {
            idno: decoded.idno(row, cells, id_pos, &config.id_column)?,
            psu,
            inclusion_probability: cells[prob_pos].as_number(),
            cells: cells.clone(),
        });
    }
    Ok(decoded.into_table(records))
}

/// Contact-form records: the contact outcome.
pub fn extract_paradata(
    frame: &LabeledFrame,
    config: &StudyConfig,
    codebook: &Codebook,
) -> Result<SurveyTable<ParadataRecord>> {
    let decoded = decode_frame(frame, codebook)?;
    let id_pos = decoded.position(&config.id_column)?;
    let outcome_pos = decoded.position(&config.roles.outcome)?;

    let mut records = Vec::with_capacity(decoded.rows.len());
    for (row, cells) in decoded.rows.iter().enumerate() {
        records.push(ParadataRecord {
            idno: decoded.idno(row, cells, id_pos, &config.id_column)?,
            outcome: cells[outcome_pos].as_category().cloned(),
            cells: cells.clone(),
        });
    }
    Ok(decoded.into_table(records))
}

/// Questionnaire records: smoking and drinking inputs of the recoder.
pub fn extract_responses(
    frame: &LabeledFrame,
    config: &StudyConfig,
    codebook: &Codebook,
) -> Result<SurveyTable<ResponseRecord>> {
    let roles = &config.roles;
    let decoded = decode_frame(frame, codebook)?;
    let id_pos = decoded.position(&config.id_column)?;
    let smoking_pos = decoded.position(&roles.smoking_status)?;
    let cigarettes_pos = decoded.position(&roles.cigarettes_per_day)?;
    let frequency_pos = decoded.position(&roles.alcohol_frequency)?;
    let weekday_pos = decoded.position(&roles.alcohol_weekday)?;
    let weekend_pos = decoded.position(&roles.alcohol_weekend)?;

    let mut records = Vec::with_capacity(decoded.rows.len());
    for (row, cells) in decoded.rows.iter().enumerate() {
        let cigarettes_per_day_raw = match cells[cigarettes_pos].as_number() {
            Some(value) => Some(decoded.count(row, &roles.cigarettes_per_day, value)?),
            None => None,
        };
        records.push(ResponseRecord {
            idno: decoded.idno(row, cells, id_pos, &config.id_column)?,
            smoking_status: cells[smoking_pos]
                .as_category()
                .and_then(|category| SmokingStatus::from_label(&category.label)),
            cigarettes_per_day_raw,
            alcohol_frequency: cells[frequency_pos]
                .as_category()
                .map(|category| AlcoholFrequency::from_label(&category.label)),
            alcohol_weekday_qty: decoded.quantity(
                row,
                &roles.alcohol_weekday,
                cells[weekday_pos].as_number(),
            )?,
            alcohol_weekend_qty: decoded.quantity(
                row,
                &roles.alcohol_weekend,
                cells[weekend_pos].as_number(),
            )?,
            cells: cells.clone(),
        });
    }
    Ok(decoded.into_table(records))
}

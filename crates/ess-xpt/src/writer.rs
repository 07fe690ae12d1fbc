//! XPT file writer.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{MISSING_STANDARD, ieee_to_ibm};
use crate::header::{
    DSCRPTR_HEADER_PREFIX, LIBRARY_HEADER_PREFIX, OBS_HEADER_PREFIX, RECORD_LEN,
    build_fixed_header, build_member_data, build_member_header, build_member_second,
    build_namestr, build_namestr_header, build_real_header,
};
use crate::types::{XptColumn, XptDataset, XptType, XptValue, XptWriterOptions};

const MAX_NAME_LEN: usize = 8;
const MAX_LABEL_LEN: usize = 40;

/// XPT file writer for a single-member V5 transport file.
pub struct XptWriter<W: Write> {
    writer: BufWriter<W>,
    options: XptWriterOptions,
}

impl<W: Write> XptWriter<W> {
    pub fn new(writer: W, options: XptWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Validate and write the dataset, then flush.
    pub fn write_dataset(mut self, dataset: &XptDataset) -> Result<()> {
        validate_dataset(dataset)?;

        let created = self.options.format_created();
        let modified = self.options.format_modified();
        let mut out = RecordWriter::new(&mut self.writer);

        out.write_record(&build_fixed_header(LIBRARY_HEADER_PREFIX))?;
        out.write_record(&build_real_header(
            &self.options.sas_version,
            &self.options.os_name,
            &created,
        ))?;
        out.write_record(&modified_record(&modified))?;

        out.write_record(&build_member_header())?;
        out.write_record(&build_fixed_header(DSCRPTR_HEADER_PREFIX))?;
        out.write_record(&build_member_data(
            &dataset.name,
            &self.options.sas_version,
            &self.options.os_name,
            &created,
        ))?;
        out.write_record(&build_member_second(&modified, dataset.label.as_deref()))?;

        out.write_record(&build_namestr_header(dataset.columns.len()))?;
        let mut position = 0u32;
        for (index, column) in dataset.columns.iter().enumerate() {
            let varnum = u16::try_from(index + 1).map_err(|_| XptError::ObservationOverflow)?;
            out.write_bytes(&build_namestr(column, varnum, position))?;
            position = position
                .checked_add(u32::from(column.length))
                .ok_or(XptError::ObservationOverflow)?;
        }
        out.finish_record()?;

        out.write_record(&build_fixed_header(OBS_HEADER_PREFIX))?;
        for row in &dataset.rows {
            for (column, value) in dataset.columns.iter().zip(row) {
                out.write_bytes(&encode_value(column, value)?)?;
            }
        }
        out.finish_record()?;

        self.writer.flush()?;
        Ok(())
    }
}

impl XptWriter<File> {
    pub fn create(path: &Path, options: XptWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, options))
    }
}

/// Write a dataset to `path` with default header metadata.
pub fn write_xpt(path: &Path, dataset: &XptDataset) -> Result<()> {
    write_xpt_with_options(path, dataset, XptWriterOptions::default())
}

pub fn write_xpt_with_options(
    path: &Path,
    dataset: &XptDataset,
    options: XptWriterOptions,
) -> Result<()> {
    XptWriter::create(path, options)?.write_dataset(dataset)
}

/// Library modified header: the datetime only.
fn modified_record(modified: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    for (slot, byte) in record.iter_mut().zip(modified.bytes().take(16)) {
        *slot = byte;
    }
    record
}

fn validate_dataset(dataset: &XptDataset) -> Result<()> {
    if !is_valid_name(&dataset.name) {
        return Err(XptError::InvalidDatasetName {
            name: dataset.name.clone(),
        });
    }
    if dataset
        .label
        .as_ref()
        .is_some_and(|label| label.chars().count() > MAX_LABEL_LEN)
    {
        return Err(XptError::LabelTooLong {
            name: dataset.name.clone(),
        });
    }

    let mut seen = BTreeSet::new();
    for column in &dataset.columns {
        if !is_valid_name(&column.name) || column.length == 0 {
            return Err(XptError::InvalidVariableName {
                name: column.name.clone(),
            });
        }
        if !seen.insert(column.name.to_ascii_uppercase()) {
            return Err(XptError::DuplicateVariable {
                name: column.name.clone(),
            });
        }
        if column
            .label
            .as_ref()
            .is_some_and(|label| label.chars().count() > MAX_LABEL_LEN)
        {
            return Err(XptError::LabelTooLong {
                name: column.name.clone(),
            });
        }
        if column.data_type == XptType::Num && !(2..=8).contains(&column.length) {
            return Err(XptError::InvalidVariableName {
                name: column.name.clone(),
            });
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.columns.len() {
            return Err(XptError::RowLengthMismatch {
                expected: dataset.columns.len(),
                actual: row.len(),
            });
        }
        for (column, value) in dataset.columns.iter().zip(row) {
            let matches = matches!(
                (column.data_type, value),
                (XptType::Num, XptValue::Num(_)) | (XptType::Char, XptValue::Char(_))
            );
            if !matches {
                return Err(XptError::TypeMismatch {
                    name: column.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Names are 1-8 ASCII letters, digits or underscores, not starting with a digit.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_NAME_LEN
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn encode_value(column: &XptColumn, value: &XptValue) -> Result<Vec<u8>> {
    let len = column.length as usize;
    match value {
        XptValue::Num(number) => {
            let bytes = match number {
                Some(number) => ieee_to_ibm(*number)?,
                None => MISSING_STANDARD,
            };
            Ok(bytes[..len.min(8)].to_vec())
        }
        XptValue::Char(text) => {
            let mut buf = vec![b' '; len];
            for (slot, ch) in buf.iter_mut().zip(text.chars()) {
                *slot = if ch.is_ascii() { ch as u8 } else { b'?' };
            }
            Ok(buf)
        }
    }
}

/// Tracks the position within the current 80-byte record and pads with spaces.
struct RecordWriter<'a, W: Write> {
    writer: &'a mut W,
    position: usize,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    fn write_record(&mut self, record: &[u8; RECORD_LEN]) -> Result<()> {
        self.finish_record()?;
        self.writer.write_all(record)?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.position = (self.position + bytes.len()) % RECORD_LEN;
        Ok(())
    }

    fn finish_record(&mut self) -> Result<()> {
        if self.position > 0 {
            let padding = vec![b' '; RECORD_LEN - self.position];
            self.writer.write_all(&padding)?;
            self.position = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("IDNO"));
        assert!(is_valid_name("_X1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1ABC"));
        assert!(!is_valid_name("TOOLONGNAME"));
    }

    #[test]
    fn duplicate_names_are_case_insensitive() {
        let ds = XptDataset::with_columns(
            "ESS",
            vec![XptColumn::numeric("idno"), XptColumn::numeric("IDNO")],
        );
        assert!(matches!(
            validate_dataset(&ds),
            Err(XptError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn row_type_mismatch_is_rejected() {
        let mut ds = XptDataset::with_columns("ESS", vec![XptColumn::numeric("IDNO")]);
        ds.add_row(vec![XptValue::character("1")]);
        assert!(matches!(
            validate_dataset(&ds),
            Err(XptError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn encode_char_pads_with_spaces() {
        let column = XptColumn::character("CNTRY", 4);
        let bytes = encode_value(&column, &XptValue::character("GB")).unwrap();
        assert_eq!(bytes, b"GB  ");
    }

    #[test]
    fn encode_missing_numeric() {
        let column = XptColumn::numeric("PROB");
        let bytes = encode_value(&column, &XptValue::numeric_missing()).unwrap();
        assert_eq!(bytes, MISSING_STANDARD.to_vec());
    }

    #[test]
    fn output_is_record_aligned() {
        let mut ds = XptDataset::with_columns(
            "ESS",
            vec![XptColumn::numeric("IDNO"), XptColumn::character("CNTRY", 2)],
        );
        ds.add_row(vec![XptValue::numeric(1.0), XptValue::character("GB")]);
        let mut buf = Vec::new();
        XptWriter::new(&mut buf, XptWriterOptions::default())
            .write_dataset(&ds)
            .unwrap();
        assert_eq!(buf.len() % RECORD_LEN, 0);
    }
}

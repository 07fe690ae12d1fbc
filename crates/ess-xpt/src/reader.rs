//! XPT file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{ibm_to_ieee, is_missing};
use crate::header::{
    DSCRPTR_HEADER_PREFIX, LIBRARY_HEADER_PREFIX, MEMBER_HEADER_PREFIX, NAMESTR_HEADER_PREFIX,
    NAMESTR_LEN, NAMESTR_LEN_VAX, OBS_HEADER_PREFIX, RECORD_LEN, align_to_record, expect_header,
    parse_dataset_label, parse_dataset_name, parse_namestr, parse_namestr_len,
    parse_variable_count,
};
use crate::types::{XptColumn, XptDataset, XptType, XptValue};

/// XPT file reader. Reads the first member of a V5 transport file.
pub struct XptReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> XptReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the entire input into memory and parse it.
    pub fn read_dataset(mut self) -> Result<XptDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_xpt_data(&data)
    }
}

impl XptReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                XptError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                XptError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read an XPT file from a path.
pub fn read_xpt(path: &Path) -> Result<XptDataset> {
    XptReader::open(path)?.read_dataset()
}

fn parse_xpt_data(data: &[u8]) -> Result<XptDataset> {
    if data.len() < RECORD_LEN * 8 {
        return Err(XptError::invalid_format("file too small"));
    }
    if !data.len().is_multiple_of(RECORD_LEN) {
        return Err(XptError::invalid_format(
            "file length is not a multiple of 80",
        ));
    }

    let mut offset = 0usize;
    expect_header(read_record(data, offset)?, LIBRARY_HEADER_PREFIX, "LIBRARY HEADER")?;
    // library real and modified headers carry nothing the pipeline uses
    offset += RECORD_LEN * 3;

    let member_header = read_record(data, offset)?;
    expect_header(member_header, MEMBER_HEADER_PREFIX, "MEMBER HEADER")?;
    let namestr_len = parse_namestr_len(member_header)?;
    if namestr_len != NAMESTR_LEN && namestr_len != NAMESTR_LEN_VAX {
        return Err(XptError::invalid_format(format!(
            "unsupported NAMESTR length {namestr_len}"
        )));
    }
    offset += RECORD_LEN;

    expect_header(read_record(data, offset)?, DSCRPTR_HEADER_PREFIX, "DSCRPTR HEADER")?;
    offset += RECORD_LEN;

    let name = parse_dataset_name(read_record(data, offset)?)?;
    offset += RECORD_LEN;
    let label = parse_dataset_label(read_record(data, offset)?);
    offset += RECORD_LEN;

    let namestr_header = read_record(data, offset)?;
    expect_header(namestr_header, NAMESTR_HEADER_PREFIX, "NAMESTR HEADER")?;
    let var_count = parse_variable_count(namestr_header)?;
    offset += RECORD_LEN;

    let mut columns = Vec::with_capacity(var_count);
    for index in 0..var_count {
        let start = offset
            .checked_add(
                index
                    .checked_mul(namestr_len)
                    .ok_or(XptError::ObservationOverflow)?,
            )
            .ok_or(XptError::ObservationOverflow)?;
        let record = read_block(data, start, namestr_len)?;
        columns.push(parse_namestr(record, index)?);
    }
    offset = align_to_record(offset + var_count * namestr_len);

    expect_header(read_record(data, offset)?, OBS_HEADER_PREFIX, "OBS HEADER")?;
    offset += RECORD_LEN;

    let obs_len = observation_length(&columns)?;
    let rows = parse_observations(data, offset, obs_len, &columns)?;

    Ok(XptDataset {
        name,
        label,
        columns,
        rows,
    })
}

fn read_record(data: &[u8], offset: usize) -> Result<&[u8]> {
    read_block(data, offset, RECORD_LEN)
}

fn read_block(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset + len)
        .ok_or(XptError::RecordOutOfBounds { offset })
}

fn observation_length(columns: &[XptColumn]) -> Result<usize> {
    columns.iter().try_fold(0usize, |total, column| {
        total
            .checked_add(column.length as usize)
            .ok_or(XptError::ObservationOverflow)
    })
}

fn parse_observations(
    data: &[u8],
    offset: usize,
    obs_len: usize,
    columns: &[XptColumn],
) -> Result<Vec<Vec<XptValue>>> {
    if obs_len == 0 {
        return Ok(Vec::new());
    }
    let body = data
        .get(offset..)
        .ok_or(XptError::RecordOutOfBounds { offset })?;

    let mut rows_total = body.len() / obs_len;
    let remainder = &body[rows_total * obs_len..];
    if remainder.iter().any(|&b| b != b' ') {
        return Err(XptError::TrailingBytes);
    }
    // Record padding can look like whole blank observations.
    while rows_total > 0 {
        let start = (rows_total - 1) * obs_len;
        if body[start..start + obs_len].iter().all(|&b| b == b' ') {
            rows_total -= 1;
        } else {
            break;
        }
    }

    Ok(body[..rows_total * obs_len]
        .chunks_exact(obs_len)
        .map(|row| parse_row(row, columns))
        .collect())
}

fn parse_row(row: &[u8], columns: &[XptColumn]) -> Vec<XptValue> {
    let mut values = Vec::with_capacity(columns.len());
    let mut pos = 0usize;
    for column in columns {
        let len = column.length as usize;
        let slice = &row[pos..pos + len];
        values.push(match column.data_type {
            XptType::Char => XptValue::Char(decode_char(slice)),
            XptType::Num => XptValue::Num(decode_numeric(slice)),
        });
        pos += len;
    }
    values
}

fn decode_char(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Numerics shorter than 8 bytes are truncated IBM floats; pad with zeros.
fn decode_numeric(bytes: &[u8]) -> Option<f64> {
    if is_missing(bytes) {
        return None;
    }
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    Some(ibm_to_ieee(buf))
}

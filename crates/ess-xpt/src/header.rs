//! XPT header records.
//!
//! A V5 transport file is a sequence of 80-byte records:
//!
//! 1. Library header, real header (SAS version, OS, created), modified header
//! 2. Member header (carries the NAMESTR length), DSCRPTR header
//! 3. Member data (dataset name, created) and member second (modified, label, type)
//! 4. NAMESTR header (carries the variable count), then one 140-byte NAMESTR per
//!    variable, padded to a record boundary
//! 5. OBS header, then fixed-width observations padded to a record boundary
//!
//! # NAMESTR layout (140 bytes, big-endian)
//!
//! | Offset | Field  | Description                    |
//! |--------|--------|--------------------------------|
//! | 0-1    | ntype  | 1=NUMERIC, 2=CHAR              |
//! | 4-5    | nlng   | Variable length in observation |
//! | 6-7    | nvar0  | Variable number                |
//! | 8-15   | nname  | Variable name                  |
//! | 16-55  | nlabel | Variable label                 |
//! | 84-87  | npos   | Position in observation        |

use crate::error::{Result, XptError};
use crate::types::{XptColumn, XptType};

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// VAX/VMS NAMESTR length.
pub const NAMESTR_LEN_VAX: usize = 136;

pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";
pub const MEMBER_HEADER_PREFIX: &str = "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
pub const DSCRPTR_HEADER_PREFIX: &str = "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
pub const NAMESTR_HEADER_PREFIX: &str = "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
pub const OBS_HEADER_PREFIX: &str = "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

/// Check that `record` is a header record with the given prefix.
pub fn expect_header(record: &[u8], prefix: &str, expected: &'static str) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format("header record too short"));
    }
    if !record.starts_with(prefix.as_bytes()) {
        return Err(XptError::missing_header(expected));
    }
    Ok(())
}

/// NAMESTR length from the member header (offset 74, 4 ASCII digits).
pub fn parse_namestr_len(record: &[u8]) -> Result<usize> {
    parse_ascii_number(record, 74, 4, "NAMESTR length")
}

/// Variable count from the NAMESTR header (offset 54, 4 ASCII digits).
pub fn parse_variable_count(record: &[u8]) -> Result<usize> {
    parse_ascii_number(record, 54, 4, "variable count")
}

/// Dataset name from the member data record (offset 8, 8 chars).
pub fn parse_dataset_name(record: &[u8]) -> Result<String> {
    let name = read_string(record, 8, 8);
    if name.is_empty() {
        return Err(XptError::invalid_format("empty dataset name"));
    }
    Ok(name)
}

/// Dataset label from the member second record (offset 32, 40 chars).
pub fn parse_dataset_label(record: &[u8]) -> Option<String> {
    let label = read_string(record, 32, 40);
    if label.is_empty() { None } else { Some(label) }
}

/// Parse one NAMESTR record.
pub fn parse_namestr(data: &[u8], index: usize) -> Result<XptColumn> {
    if data.len() < 88 {
        return Err(XptError::InvalidNamestr {
            index,
            message: format!("data too short: {} bytes", data.len()),
        });
    }
    let ntype = read_i16(data, 0);
    let data_type = XptType::from_ntype(ntype).ok_or_else(|| XptError::InvalidNamestr {
        index,
        message: format!("invalid ntype: {ntype}"),
    })?;
    let length = u16::try_from(read_i16(data, 4)).unwrap_or(0);
    if length == 0 {
        return Err(XptError::InvalidNamestr {
            index,
            message: "variable length is zero".to_string(),
        });
    }
    let name = read_string(data, 8, 8);
    if name.is_empty() {
        return Err(XptError::InvalidNamestr {
            index,
            message: "empty variable name".to_string(),
        });
    }
    let label = read_string(data, 16, 40);
    Ok(XptColumn {
        name,
        label: if label.is_empty() { None } else { Some(label) },
        data_type,
        length,
    })
}

/// Build one 140-byte NAMESTR record.
#[must_use]
pub fn build_namestr(column: &XptColumn, varnum: u16, position: u32) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];
    buf[0..2].copy_from_slice(&column.data_type.to_ntype().to_be_bytes());
    buf[4..6].copy_from_slice(&column.length.to_be_bytes());
    buf[6..8].copy_from_slice(&varnum.to_be_bytes());
    write_string(&mut buf, 8, &column.name, 8);
    write_string(&mut buf, 16, column.label.as_deref().unwrap_or(""), 40);
    // nform and niform stay blank
    write_string(&mut buf, 56, "", 8);
    write_string(&mut buf, 72, "", 8);
    buf[84..88].copy_from_slice(&position.to_be_bytes());
    buf
}

/// Build a fixed header record: prefix, 30 ASCII zeros, 2 spaces.
#[must_use]
pub fn build_fixed_header(prefix: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, prefix, 48);
    record[48..78].fill(b'0');
    record
}

/// Member header with the NAMESTR length in its last digits.
#[must_use]
pub fn build_member_header() -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(MEMBER_HEADER_PREFIX);
    write_string(&mut record, 48, "000000000000000001600000000140", 30);
    record
}

/// NAMESTR header with the variable count at offset 54.
#[must_use]
pub fn build_namestr_header(var_count: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(NAMESTR_HEADER_PREFIX);
    write_string(&mut record, 54, &format!("{var_count:04}"), 4);
    record
}

/// First real header: SAS symbols, version, OS, created datetime.
#[must_use]
pub fn build_real_header(sas_version: &str, os_name: &str, created: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, "SAS", 8);
    write_string(&mut record, 16, "SASLIB", 8);
    write_string(&mut record, 24, sas_version, 8);
    write_string(&mut record, 32, os_name, 8);
    write_string(&mut record, 64, created, 16);
    record
}

/// Member data record: dataset name, version, OS, created datetime.
#[must_use]
pub fn build_member_data(
    name: &str,
    sas_version: &str,
    os_name: &str,
    created: &str,
) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, name, 8);
    write_string(&mut record, 16, "SASDATA", 8);
    write_string(&mut record, 24, sas_version, 8);
    write_string(&mut record, 32, os_name, 8);
    write_string(&mut record, 64, created, 16);
    record
}

/// Member second record: modified datetime, dataset label.
#[must_use]
pub fn build_member_second(modified: &str, label: Option<&str>) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, modified, 16);
    write_string(&mut record, 32, label.unwrap_or(""), 40);
    record
}

/// Round `offset` up to the next record boundary.
pub fn align_to_record(offset: usize) -> usize {
    offset.div_ceil(RECORD_LEN) * RECORD_LEN
}

fn parse_ascii_number(record: &[u8], offset: usize, len: usize, field: &str) -> Result<usize> {
    if record.len() < offset + len {
        return Err(XptError::invalid_format("header record too short"));
    }
    read_string(record, offset, len)
        .trim()
        .parse::<usize>()
        .map_err(|_| XptError::NumericParse {
            field: field.to_string(),
        })
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read a string, trimming trailing spaces and NULs.
fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    data.get(offset..offset + len)
        .map(|slice| {
            String::from_utf8_lossy(slice)
                .trim_end_matches([' ', '\0'])
                .to_string()
        })
        .unwrap_or_default()
}

/// Write a string space-padded to `len`; non-ASCII characters become `?`.
fn write_string(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let field = &mut buf[offset..offset + len];
    field.fill(b' ');
    for (slot, ch) in field.iter_mut().zip(value.chars()) {
        *slot = if ch.is_ascii() { ch as u8 } else { b'?' };
    }
}

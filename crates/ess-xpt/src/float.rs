//! IBM System/360 hexadecimal floating point <-> IEEE 754 conversion.
//!
//! XPT stores numbers as 8-byte IBM floats: sign bit, 7-bit base-16 exponent
//! biased by 64, 56-bit fraction. Missing values are a single marker byte
//! (`.`, `_` or `A`-`Z`) followed by seven zero bytes.

use crate::error::{Result, XptError};

/// Standard SAS missing value (`.`).
pub const MISSING_STANDARD: [u8; 8] = [0x2e, 0, 0, 0, 0, 0, 0, 0];

/// Returns true if the bytes encode any SAS missing value.
pub fn is_missing(bytes: &[u8]) -> bool {
    let Some((&first, rest)) = bytes.split_first() else {
        return true;
    };
    let marker = first == b'.' || first == b'_' || first.is_ascii_uppercase();
    marker && rest.iter().all(|&b| b == 0)
}

/// Convert an IBM float to IEEE.
pub fn ibm_to_ieee(bytes: [u8; 8]) -> f64 {
    let bits = u64::from_be_bytes(bytes);
    let negative = bits >> 63 == 1;
    let exponent = ((bits >> 56) & 0x7f) as i32;
    let fraction = bits & 0x00ff_ffff_ffff_ffff;
    if fraction == 0 {
        return 0.0;
    }
    // 0.fraction * 16^(exponent - 64)
    let magnitude = fraction as f64 * 2f64.powi(4 * (exponent - 64) - 56);
    if negative { -magnitude } else { magnitude }
}

/// Convert an IEEE float to IBM.
///
/// Values below the IBM range flush to zero; values above it are an error.
pub fn ieee_to_ibm(value: f64) -> Result<[u8; 8]> {
    if !value.is_finite() {
        return Err(XptError::FloatConversion {
            message: format!("{value} has no IBM representation"),
        });
    }
    let bits = value.to_bits();
    let sign = bits >> 63;
    let biased = ((bits >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // Zero and subnormals are far below the IBM range.
        return Ok([0; 8]);
    }
    let mantissa = (bits & 0x000f_ffff_ffff_ffff) | (1 << 52);
    // value = (mantissa / 2^53) * 2^p with the leading factor in [0.5, 1)
    let p = biased - 1022;
    let q = p.div_euclid(4) + i32::from(p.rem_euclid(4) != 0);
    let shift = 4 * q - p;
    let exponent = q + 64;
    if exponent > 127 {
        return Err(XptError::FloatConversion {
            message: format!("{value} exceeds the IBM float range"),
        });
    }
    if exponent < 0 {
        return Ok([0; 8]);
    }
    let fraction = mantissa << (3 - shift);
    let ibm = (sign << 63) | ((exponent as u64) << 56) | fraction;
    Ok(ibm.to_be_bytes())
}

//! 6-decimal-class fixed-point integer arithmetic: parse/format, scaled
//! multiply/divide with truncating rounding, and precision conversion.
//!
//! Every amount in the ledger is an exact, nonnegative `u64` scaled by
//! `10^precision`; there is no floating point anywhere downstream of this
//! module.

use crate::error::{GeniusError, Result};
use crate::MAX_PRECISION;

fn pow10(precision: u8) -> Result<u64> {
    if precision > MAX_PRECISION {
        return Err(GeniusError::ValueTooLarge { precision });
    }
    Ok(10u64.pow(precision as u32))
}

/// Parses `"I.F"` (or a bare integer with no dot) into `value = I * 10^p +
/// F` at fixed precision `p`. Fails on empty input, non-digit characters,
/// or a fractional part longer than `p` digits.
pub fn from_string(value: &str, precision: u8) -> Result<u64> {
    let scale = pow10(precision)?;
    if value.is_empty() {
        return Err(GeniusError::invalid_amount("empty input"));
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    if frac_part.len() > precision as usize {
        return Err(GeniusError::ValueTooLarge { precision });
    }
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GeniusError::invalid_amount(format!(
            "non-digit integer part: {int_part:?}"
        )));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GeniusError::invalid_amount(format!(
            "non-digit fractional part: {frac_part:?}"
        )));
    }

    let integer: u64 = int_part
        .parse()
        .map_err(|_| GeniusError::ValueTooLarge { precision })?;
    let mut fractional: u64 = if frac_part.is_empty() {
        0
    } else {
        frac_part
            .parse()
            .map_err(|_| GeniusError::ValueTooLarge { precision })?
    };
    for _ in frac_part.len()..precision as usize {
        fractional = fractional
            .checked_mul(10)
            .ok_or(GeniusError::ValueTooLarge { precision })?;
    }

    integer
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fractional))
        .ok_or(GeniusError::ValueTooLarge { precision })
}

/// Formats `value` at fixed precision `p` as `"I.F"`, zero-padding the
/// fractional part to exactly `p` digits.
pub fn to_string(value: u64, precision: u8) -> Result<String> {
    let scale = pow10(precision)?;
    let integer = value / scale;
    let fractional = value % scale;
    Ok(format!(
        "{integer}.{fractional:0width$}",
        width = precision as usize
    ))
}

/// `a * b / 10^p`, truncating. Fails with `ValueTooLarge` if the result
/// overflows `u64`.
pub fn multiply(a: u64, b: u64, precision: u8) -> Result<u64> {
    let scale = pow10(precision)?;
    let product = (a as u128) * (b as u128);
    let result = product / (scale as u128);
    u64::try_from(result).map_err(|_| GeniusError::ValueTooLarge { precision })
}

/// `a * 10^p / b`, truncating. Fails with `OutOfRange` on division by
/// zero, `ValueTooLarge` on overflow.
pub fn divide(a: u64, b: u64, precision: u8) -> Result<u64> {
    let scale = pow10(precision)?;
    if b == 0 {
        return Err(GeniusError::OutOfRange {
            reason: "division by zero".into(),
        });
    }
    let result = (a as u128) * (scale as u128) / (b as u128);
    u64::try_from(result).map_err(|_| GeniusError::ValueTooLarge { precision })
}

/// Rescales `value` from precision `from` to precision `to`, multiplying
/// or integer-dividing by `10^|to-from|` as needed.
pub fn convert_precision(value: u64, from: u8, to: u8) -> Result<u64> {
    pow10(from)?;
    pow10(to)?;
    if from == to {
        return Ok(value);
    }
    if to > from {
        let factor = pow10(to - from)?;
        value
            .checked_mul(factor)
            .ok_or(GeniusError::ValueTooLarge { precision: to })
    } else {
        let factor = pow10(from - to)?;
        Ok(value / factor)
    }
}

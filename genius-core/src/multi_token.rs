//! Child-token amount parsing/formatting against a token's value expressed
//! in native minions (spec §4.L).

use crate::error::Result;
use crate::fixed_point;
use crate::NATIVE_PRECISION;

/// Parses `text` (a decimal string in the child token's own units) into
/// native minions, given the token's `value_in_native` — itself a
/// [`NATIVE_PRECISION`]-scaled fixed-point amount of native per one whole
/// child token.
pub fn parse_child_tokens(text: &str, value_in_native: u64) -> Result<u64> {
    let child_units = fixed_point::from_string(text, NATIVE_PRECISION)?;
    fixed_point::multiply(child_units, value_in_native, NATIVE_PRECISION)
}

/// The inverse of [`parse_child_tokens`]: renders `native_minions` as a
/// decimal string in the child token's own units.
pub fn format_child_tokens(native_minions: u64, value_in_native: u64) -> Result<String> {
    let child_units = fixed_point::divide(native_minions, value_in_native, NATIVE_PRECISION)?;
    fixed_point::to_string(child_units, NATIVE_PRECISION)
}

//! Deterministic price-per-byte cost estimation (spec §4.K).

use crate::error::{GeniusError, Result};
use crate::fixed_point;
use crate::NATIVE_PRECISION;

/// Internal precision everything is carried at before the final
/// conversion to minions, high enough that `5×10^-13` doesn't round away.
const USD_PRECISION: u8 = 18;

/// `total_bytes × 20 × 5×10^-13`, expressed as a fixed-point scale factor
/// at [`USD_PRECISION`]: `20 × 5×10^-13 × 10^18 = 10^7`.
const FLOPS_TO_USD_SCALE: u64 = 10_000_000;

/// `cost_minions(total_bytes, price_usd_per_native)`, `price_usd_per_native`
/// given as a [`USD_PRECISION`]-scaled fixed-point value:
/// 1. `flops = total_bytes × 20`
/// 2. `usd = flops × 5×10^-13`
/// 3. `native = usd / price_usd_per_native`, held at fixed precision
/// 4. convert to precision 6; a nonzero cost that rounds to zero becomes
///    the minimum unit, 1.
pub fn cost_minions(total_bytes: u64, price_usd_per_native: u64) -> Result<u64> {
    let usd_fp = total_bytes
        .checked_mul(FLOPS_TO_USD_SCALE)
        .ok_or(GeniusError::ValueTooLarge {
            precision: USD_PRECISION,
        })?;

    let native_fp = fixed_point::divide(usd_fp, price_usd_per_native, USD_PRECISION)?;
    let minions = fixed_point::convert_precision(native_fp, USD_PRECISION, NATIVE_PRECISION)?;

    if minions == 0 && total_bytes > 0 {
        Ok(1)
    } else {
        Ok(minions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes_cost_nothing() {
        assert_eq!(cost_minions(0, 1_000_000_000_000_000_000).unwrap(), 0);
    }

    #[test]
    fn tiny_cost_floors_to_minimum_unit() {
        let cost = cost_minions(1, 1_000_000_000_000_000_000).unwrap();
        assert_eq!(cost, 1);
    }

    #[test]
    fn cost_scales_linearly_with_bytes() {
        let price = 1_000_000_000_000_000_000;
        let one = cost_minions(1_000_000_000, price).unwrap();
        let two = cost_minions(2_000_000_000, price).unwrap();
        assert_eq!(two, one * 2);
    }

    #[test]
    fn higher_native_price_yields_lower_cost() {
        let bytes = 1_000_000_000;
        let cheap = cost_minions(bytes, 2_000_000_000_000_000_000).unwrap();
        let pricier = cost_minions(bytes, 1_000_000_000_000_000_000).unwrap();
        assert!(cheap < pricier);
    }

    #[test]
    fn division_by_zero_price_is_out_of_range() {
        assert!(matches!(
            cost_minions(100, 0),
            Err(GeniusError::OutOfRange { .. })
        ));
    }
}

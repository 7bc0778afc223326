//! Pure conversion module for raw on-chain amounts to token units.
//!
//! All math uses `rust_decimal::Decimal` for exact arithmetic.
//! No async, no network calls.

use std::fmt;

use ethers::types::{I256, U256};
use rust_decimal::Decimal;

/// Decimals of the chain's native currency (wei per ETH).
pub const NATIVE_DECIMALS: u8 = 18;

/// `Decimal` carries a 96-bit mantissa with at most 28 fractional digits.
const MAX_SCALE: u8 = 28;

/// Errors that can occur while scaling raw amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingError {
    UnsupportedDecimals(u8),
    Overflow { context: String },
    ZeroQuantity,
}

impl fmt::Display for ScalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingError::UnsupportedDecimals(d) => {
                write!(f, "Token decimals {} exceed supported precision", d)
            }
            ScalingError::Overflow { context } => write!(f, "Overflow: {}", context),
            ScalingError::ZeroQuantity => write!(f, "Quantity scaled to zero"),
        }
    }
}

impl std::error::Error for ScalingError {}

/// Convert a raw unsigned amount to whole-token units: `raw / 10^decimals`.
pub fn scale_raw_amount(raw: U256, decimals: u8) -> Result<Decimal, ScalingError> {
    if decimals > MAX_SCALE {
        return Err(ScalingError::UnsupportedDecimals(decimals));
    }

    let value = u128::try_from(raw).map_err(|_| ScalingError::Overflow {
        context: format!("raw amount {} does not fit in u128", raw),
    })?;

    let value = i128::try_from(value).map_err(|_| ScalingError::Overflow {
        context: format!("raw amount {} does not fit in i128", raw),
    })?;

    Decimal::try_from_i128_with_scale(value, decimals as u32).map_err(|_| ScalingError::Overflow {
        context: format!("raw amount {} exceeds decimal precision", raw),
    })
}

/// Convert a signed pool balance delta to its whole-token magnitude.
///
/// Swap deltas are signed from the pool's perspective; trade quantities and
/// values only ever use the magnitude, direction is classified separately.
pub fn scale_signed_magnitude(delta: I256, decimals: u8) -> Result<Decimal, ScalingError> {
    scale_raw_amount(delta.unsigned_abs(), decimals)
}

/// Convert a wei amount to native-currency units.
pub fn wei_to_eth(raw: U256) -> Result<Decimal, ScalingError> {
    scale_raw_amount(raw, NATIVE_DECIMALS)
}

/// Per-token price: `value / quantity`.
///
/// A zero quantity is rejected rather than floored — a fill that moved no
/// tokens has no meaningful price and must not reach the candle pipeline.
pub fn unit_price(value: Decimal, quantity: Decimal) -> Result<Decimal, ScalingError> {
    if quantity.is_zero() {
        return Err(ScalingError::ZeroQuantity);
    }

    value
        .checked_div(quantity)
        .ok_or_else(|| ScalingError::Overflow {
            context: format!("{} / {}", value, quantity),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromStr;

    #[test]
    fn test_scale_raw_amount_18_decimals() {
        // 1.5 tokens in wei
        let raw = U256::from(1_500_000_000_000_000_000u128);
        let scaled = scale_raw_amount(raw, 18).unwrap();
        assert_eq!(scaled, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_scale_raw_amount_zero_decimals() {
        let scaled = scale_raw_amount(U256::from(42u64), 0).unwrap();
        assert_eq!(scaled, Decimal::from(42));
    }

    #[test]
    fn test_scale_raw_amount_rejects_wide_values() {
        let result = scale_raw_amount(U256::MAX, 18);
        assert!(matches!(result, Err(ScalingError::Overflow { .. })));
    }

    #[test]
    fn test_scale_raw_amount_rejects_wide_decimals() {
        let result = scale_raw_amount(U256::from(1u64), 40);
        assert!(matches!(result, Err(ScalingError::UnsupportedDecimals(40))));
    }

    #[test]
    fn test_scale_signed_magnitude() {
        let delta = I256::from(-1_000_000_000_000_000_000i128);
        let scaled = scale_signed_magnitude(delta, 18).unwrap();
        assert_eq!(scaled, Decimal::from(1));
    }

    #[test]
    fn test_wei_to_eth() {
        let one_eth = U256::from(10u128.pow(18));
        assert_eq!(wei_to_eth(one_eth).unwrap(), Decimal::from(1));
    }

    #[test]
    fn test_unit_price() {
        let price = unit_price(Decimal::from(50), Decimal::from(100)).unwrap();
        assert_eq!(price, Decimal::from_str("0.5").unwrap());
    }

    #[test]
    fn test_unit_price_rejects_zero_quantity() {
        let result = unit_price(Decimal::from(50), Decimal::ZERO);
        assert_eq!(result, Err(ScalingError::ZeroQuantity));
    }
}

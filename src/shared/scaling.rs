//! Pure conversion module between raw fixed-point token amounts and decimals.
//!
//! All value math uses `rust_decimal::Decimal` for exact arithmetic. The only
//! `f64` path is [`fixed_point_to_f64`], used for chart-grade prices.
//! No async, no network calls.

use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Largest scale `Decimal` can represent.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Errors that can occur during fixed-point scaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingError {
    Negative(String),
    Overflow { context: String },
    FractionalAmount { value: String },
    UnsupportedDecimals(u32),
}

impl fmt::Display for ScalingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingError::Negative(v) => write!(f, "Amount must not be negative, got {}", v),
            ScalingError::Overflow { context } => write!(f, "Overflow: {}", context),
            ScalingError::FractionalAmount { value } => {
                write!(f, "Fractional base units not allowed: {}", value)
            }
            ScalingError::UnsupportedDecimals(d) => {
                write!(f, "Unsupported decimals {} (max {})", d, MAX_DECIMAL_SCALE)
            }
        }
    }
}

impl std::error::Error for ScalingError {}

/// Convert a raw on-chain amount into a human-readable decimal.
///
/// ```text
/// value = raw / 10^decimals
/// ```
pub fn from_fixed_point(raw: u128, decimals: u32) -> Result<Decimal, ScalingError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(ScalingError::UnsupportedDecimals(decimals));
    }
    let signed = i128::try_from(raw).map_err(|_| ScalingError::Overflow {
        context: format!("raw amount {} does not fit in i128", raw),
    })?;
    Decimal::try_from_i128_with_scale(signed, decimals).map_err(|_| ScalingError::Overflow {
        context: format!("raw amount {} exceeds 96-bit decimal mantissa", raw),
    })
}

/// Convert a human-readable decimal into a raw on-chain amount.
///
/// ```text
/// raw = value * 10^decimals    (must be a whole number)
/// ```
pub fn to_fixed_point(value: Decimal, decimals: u32) -> Result<u128, ScalingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ScalingError::Negative(value.to_string()));
    }
    let multiplier = 10u64
        .checked_pow(decimals)
        .ok_or_else(|| ScalingError::Overflow {
            context: format!("10^{} overflow", decimals),
        })?;

    let scaled = value
        .checked_mul(Decimal::from(multiplier))
        .ok_or_else(|| ScalingError::Overflow {
            context: format!("{} * 10^{}", value, decimals),
        })?;

    if scaled.fract() != Decimal::ZERO {
        return Err(ScalingError::FractionalAmount {
            value: scaled.to_string(),
        });
    }

    scaled.to_u128().ok_or_else(|| ScalingError::Overflow {
        context: format!("{} does not fit in u128", scaled),
    })
}

/// Lossy conversion for prices that feed ratios and charts.
pub fn fixed_point_to_f64(raw: u128, decimals: u32) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_fixed_point_eighteen_decimals() {
        let v = from_fixed_point(2_000_000_000_000_000_000, 18).unwrap();
        assert_eq!(v, Decimal::from(2));

        let v = from_fixed_point(1_500_000, 6).unwrap();
        assert_eq!(v, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_from_fixed_point_rejects_huge_values() {
        assert!(matches!(
            from_fixed_point(u128::MAX, 18),
            Err(ScalingError::Overflow { .. })
        ));
        assert_eq!(
            from_fixed_point(1, 40),
            Err(ScalingError::UnsupportedDecimals(40))
        );
    }

    #[test]
    fn test_to_fixed_point_whole_units() {
        let raw = to_fixed_point(Decimal::from_str("12.34").unwrap(), 6).unwrap();
        assert_eq!(raw, 12_340_000);
    }

    #[test]
    fn test_to_fixed_point_rejects_sub_unit_precision() {
        let err = to_fixed_point(Decimal::from_str("0.0000001").unwrap(), 6).unwrap_err();
        assert!(matches!(err, ScalingError::FractionalAmount { .. }));
    }

    #[test]
    fn test_to_fixed_point_rejects_negative() {
        let err = to_fixed_point(Decimal::from(-1), 6).unwrap_err();
        assert!(matches!(err, ScalingError::Negative(_)));
    }

    #[test]
    fn test_fixed_point_to_f64() {
        assert_eq!(fixed_point_to_f64(600_000_000_000_000_000, 18), 0.6);
        assert_eq!(fixed_point_to_f64(0, 18), 0.0);
    }
}

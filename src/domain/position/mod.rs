//! Position domain — holder balances and their USD valuation.

pub mod client;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::program::constants::{OUTCOME_TOKEN_DECIMALS, STABLE_DECIMALS};
use crate::shared::{from_fixed_point, ScalingError};

// ─── Balances ────────────────────────────────────────────────────────────────

/// A holder's raw balances in each token's native fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenBalances {
    /// UP token, 18 decimals.
    pub up: u128,
    /// DOWN token, 18 decimals.
    pub down: u128,
    /// Stable settlement token, 6 decimals.
    pub stable: u128,
}

impl TokenBalances {
    pub fn up_amount(&self) -> Result<Decimal, ScalingError> {
        from_fixed_point(self.up, OUTCOME_TOKEN_DECIMALS)
    }

    pub fn down_amount(&self) -> Result<Decimal, ScalingError> {
        from_fixed_point(self.down, OUTCOME_TOKEN_DECIMALS)
    }

    pub fn stable_amount(&self) -> Result<Decimal, ScalingError> {
        from_fixed_point(self.stable, STABLE_DECIMALS)
    }

    /// Display strings: stable to 2 places, outcome tokens to 4.
    pub fn formatted(&self) -> Result<FormattedBalances, ScalingError> {
        Ok(FormattedBalances {
            up: format!("{:.4}", self.up_amount()?.round_dp(4)),
            down: format!("{:.4}", self.down_amount()?.round_dp(4)),
            stable: format!("{:.2}", self.stable_amount()?.round_dp(2)),
        })
    }
}

/// Human-readable balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBalances {
    pub up: String,
    pub down: String,
    pub stable: String,
}

// ─── Valuation ───────────────────────────────────────────────────────────────

/// USD value of a holder's position at the latest known price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub up_value_usd: Decimal,
    pub down_value_usd: Decimal,
    pub stable_value_usd: Decimal,
}

impl PositionValuation {
    pub fn total_usd(&self) -> Decimal {
        self.up_value_usd + self.down_value_usd + self.stable_value_usd
    }
}

/// Value balances at `up_price_usd`.
///
/// ```text
/// up_value     = up / 1e18   * up_price         * backing_multiplier
/// down_value   = down / 1e18 * (1 - up_price)   * backing_multiplier
/// stable_value = stable / 1e6
/// ```
///
/// `backing_multiplier` is the stable value one UP + one DOWN pair redeems
/// for. With no price yet, outcome tokens are valued at zero.
pub fn value_position(
    balances: &TokenBalances,
    up_price_usd: Option<f64>,
    backing_multiplier: Decimal,
) -> Result<PositionValuation, ScalingError> {
    let stable_value_usd = balances.stable_amount()?;

    let Some(up_price) = up_price_usd else {
        return Ok(PositionValuation {
            up_value_usd: Decimal::ZERO,
            down_value_usd: Decimal::ZERO,
            stable_value_usd,
        });
    };

    let up_price = Decimal::from_f64(up_price)
        .filter(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE)
        .ok_or_else(|| ScalingError::Overflow {
            context: format!("up price {} is not a unit-interval decimal", up_price),
        })?;
    let down_price = Decimal::ONE - up_price;

    let up_value_usd = balances
        .up_amount()?
        .checked_mul(up_price * backing_multiplier)
        .ok_or_else(|| ScalingError::Overflow {
            context: "up value".to_string(),
        })?;
    let down_value_usd = balances
        .down_amount()?
        .checked_mul(down_price * backing_multiplier)
        .ok_or_else(|| ScalingError::Overflow {
            context: "down value".to_string(),
        })?;

    Ok(PositionValuation {
        up_value_usd,
        down_value_usd,
        stable_value_usd,
    })
}

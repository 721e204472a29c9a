//! Market domain — AMM spot prices and reserves.

pub mod client;

use serde::{Deserialize, Serialize};

use crate::error::{AbiError, RpcError};
use crate::ledger::{read_uint, LedgerReader};
use crate::program::calls::{
    build_down_reserves_call, build_get_down_price_call, build_get_up_price_call,
    build_up_reserves_call,
};
use crate::program::constants::PRICE_DECIMALS;
use crate::shared::scaling::fixed_point_to_f64;
use crate::shared::Address;

/// Normalized USD value of one UP token from the AMM's two raw prices.
///
/// ```text
/// up_usd = 1 / (1 + (down / 1e18) / (up / 1e18))
/// ```
///
/// One UP plus one DOWN is backed by one unit of value, and the raw prices
/// are proportional to each side's scarcity. Returns `None` when the up
/// price is zero, where the ratio is undefined.
pub fn up_price_usd(up_price_raw: u128, down_price_raw: u128) -> Option<f64> {
    if up_price_raw == 0 {
        return None;
    }
    let up = fixed_point_to_f64(up_price_raw, PRICE_DECIMALS);
    let down = fixed_point_to_f64(down_price_raw, PRICE_DECIMALS);
    let value = 1.0 / (1.0 + down / up);
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value)
}

/// `getUpPrice()` / `getDownPrice()` read at one block (18-decimal fixed point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPricePair {
    pub up_price_raw: u128,
    pub down_price_raw: u128,
}

impl RawPricePair {
    pub fn up_price_usd(&self) -> Option<f64> {
        up_price_usd(self.up_price_raw, self.down_price_raw)
    }

    /// Complement of [`Self::up_price_usd`]; the two always sum to 1.
    pub fn down_price_usd(&self) -> Option<f64> {
        self.up_price_usd().map(|up| 1.0 - up)
    }
}

/// AMM reserves read at one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    pub up_reserve: u128,
    pub down_reserve: u128,
}

/// Spot view of a market at one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub block_number: u64,
    pub prices: RawPricePair,
    pub reserves: ReservePair,
    /// `None` when the up price is zero.
    pub up_price_usd: Option<f64>,
    pub down_price_usd: Option<f64>,
}

/// Read both raw prices as of `at` (`None` = latest).
pub async fn read_price_pair<E>(
    ledger: &dyn LedgerReader,
    amm: &Address,
    at: Option<u64>,
) -> Result<RawPricePair, E>
where
    E: From<RpcError> + From<AbiError>,
{
    let up_price_raw = read_uint::<E>(ledger, &build_get_up_price_call(amm), at).await?;
    let down_price_raw = read_uint::<E>(ledger, &build_get_down_price_call(amm), at).await?;
    Ok(RawPricePair {
        up_price_raw,
        down_price_raw,
    })
}

/// Read both reserves as of `at` (`None` = latest).
pub async fn read_reserves<E>(
    ledger: &dyn LedgerReader,
    amm: &Address,
    at: Option<u64>,
) -> Result<ReservePair, E>
where
    E: From<RpcError> + From<AbiError>,
{
    let up_reserve = read_uint::<E>(ledger, &build_up_reserves_call(amm), at).await?;
    let down_reserve = read_uint::<E>(ledger, &build_down_reserves_call(amm), at).await?;
    Ok(ReservePair {
        up_reserve,
        down_reserve,
    })
}

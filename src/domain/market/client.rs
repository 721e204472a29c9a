//! Markets sub-client — spot prices, reserves, swap quotes.

use super::{read_price_pair, read_reserves, MarketSnapshot, RawPricePair, ReservePair};
use crate::client::OpinionClient;
use crate::error::SdkError;
use crate::ledger::{read_uint, LedgerReader};
use crate::program::calls::build_get_amount_out_call;

pub struct Markets<'a> {
    pub(crate) client: &'a OpinionClient,
}

impl<'a> Markets<'a> {
    /// Raw `getUpPrice` / `getDownPrice` as of `at` (`None` = head, resolved
    /// once so both reads see the same block).
    pub async fn prices(&self, at: Option<u64>) -> Result<RawPricePair, SdkError> {
        let ledger = self.client.reader();
        let height = pin_height(&ledger, at).await?;
        read_price_pair(&ledger, &self.client.contracts.amm, Some(height)).await
    }

    /// AMM reserves as of `at` (`None` = head, resolved once).
    pub async fn reserves(&self, at: Option<u64>) -> Result<ReservePair, SdkError> {
        let ledger = self.client.reader();
        let height = pin_height(&ledger, at).await?;
        read_reserves(&ledger, &self.client.contracts.amm, Some(height)).await
    }

    /// Prices and reserves pinned to a single block.
    ///
    /// With `at = None` the head is resolved first so both reads agree.
    pub async fn spot(&self, at: Option<u64>) -> Result<MarketSnapshot, SdkError> {
        let ledger = self.client.reader();
        let block_number = pin_height(&ledger, at).await?;
        let amm = &self.client.contracts.amm;
        let prices = read_price_pair::<SdkError>(&ledger, amm, Some(block_number)).await?;
        let reserves = read_reserves::<SdkError>(&ledger, amm, Some(block_number)).await?;
        Ok(MarketSnapshot {
            block_number,
            prices,
            reserves,
            up_price_usd: prices.up_price_usd(),
            down_price_usd: prices.down_price_usd(),
        })
    }

    /// Expected output of swapping `amount_in`, priced by the AMM's own
    /// `getAmountOut` against the reserves of the same block.
    pub async fn quote(
        &self,
        amount_in: u128,
        is_up_to_down: bool,
        at: Option<u64>,
    ) -> Result<u128, SdkError> {
        if amount_in == 0 {
            return Err(SdkError::Validation("amount_in must be positive".to_string()));
        }
        let ledger = self.client.reader();
        let amm = &self.client.contracts.amm;
        let height = Some(pin_height(&ledger, at).await?);
        let reserves = read_reserves::<SdkError>(&ledger, amm, height).await?;
        let (reserve_in, reserve_out) = if is_up_to_down {
            (reserves.up_reserve, reserves.down_reserve)
        } else {
            (reserves.down_reserve, reserves.up_reserve)
        };
        let call = build_get_amount_out_call(amm, amount_in, reserve_in, reserve_out);
        read_uint(&ledger, &call, height).await
    }
}

async fn pin_height(ledger: &dyn LedgerReader, at: Option<u64>) -> Result<u64, SdkError> {
    match at {
        Some(height) => Ok(height),
        None => Ok(ledger.get_block_number().await?),
    }
}

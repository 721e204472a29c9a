//! Positions sub-client — holder balances, valuation, entry/exit calldata.

use super::{value_position, PositionValuation, TokenBalances};
use crate::client::OpinionClient;
use crate::error::SdkError;
use crate::ledger::read_uint;
use crate::program::calls::{
    build_balance_of_call, build_enter_market_call, build_exit_market_call, CallRequest,
    EnterMarketParams, ExitMarketParams,
};
use crate::program::constants::{OUTCOME_TOKEN_DECIMALS, STABLE_DECIMALS};
use crate::shared::{to_fixed_point, Address};

use rust_decimal::Decimal;

pub struct Positions<'a> {
    pub(crate) client: &'a OpinionClient,
}

impl<'a> Positions<'a> {
    /// `balanceOf(holder)` on the UP, DOWN and stable tokens, at the head.
    pub async fn balances(&self, holder: &Address) -> Result<TokenBalances, SdkError> {
        let contracts = &self.client.contracts;
        let up_token = contracts.require_up_token()?;
        let down_token = contracts.require_down_token()?;
        let stable_token = contracts.require_stable_token()?;

        let ledger = self.client.reader();
        let up = read_uint::<SdkError>(&ledger, &build_balance_of_call(&up_token, holder), None)
            .await?;
        let down =
            read_uint::<SdkError>(&ledger, &build_balance_of_call(&down_token, holder), None)
                .await?;
        let stable =
            read_uint::<SdkError>(&ledger, &build_balance_of_call(&stable_token, holder), None)
                .await?;

        Ok(TokenBalances { up, down, stable })
    }

    /// Current balances valued at the latest stored price point.
    pub async fn valuation(&self, holder: &Address) -> Result<PositionValuation, SdkError> {
        let balances = self.balances(holder).await?;
        let up_price_usd = self.client.price_history().latest_up_price_usd().await;
        if up_price_usd.is_none() {
            tracing::debug!(holder = %holder, "No price history yet, outcome tokens valued at zero");
        }
        self.value(&balances, up_price_usd)
    }

    /// Value `balances` at `up_price_usd` with the configured backing multiplier.
    pub fn value(
        &self,
        balances: &TokenBalances,
        up_price_usd: Option<f64>,
    ) -> Result<PositionValuation, SdkError> {
        Ok(value_position(
            balances,
            up_price_usd,
            self.client.backing_multiplier,
        )?)
    }

    /// `enterMarket` calldata for `holder`'s delegated account.
    ///
    /// `stable_amount` is in whole stable units, `min_amount_out` in whole
    /// outcome tokens.
    pub fn enter_market_call(
        &self,
        holder: &Address,
        up: bool,
        stable_amount: Decimal,
        min_amount_out: Decimal,
    ) -> Result<CallRequest, SdkError> {
        if stable_amount <= Decimal::ZERO {
            return Err(SdkError::Validation(
                "stable_amount must be positive".to_string(),
            ));
        }
        let contracts = &self.client.contracts;
        let params = EnterMarketParams {
            stable_token: contracts.require_stable_token()?,
            liquidity_engine: contracts.require_liquidity_engine()?,
            amm: contracts.amm,
            up,
            stable_amount: to_fixed_point(stable_amount, STABLE_DECIMALS)?,
            min_amount_out: to_fixed_point(min_amount_out, OUTCOME_TOKEN_DECIMALS)?,
        };
        Ok(build_enter_market_call(holder, &params))
    }

    /// `exitMarket` calldata for `holder`'s delegated account.
    ///
    /// Burns `burn_amount` whole UP + DOWN pairs.
    pub fn exit_market_call(
        &self,
        holder: &Address,
        burn_amount: Decimal,
        up: bool,
    ) -> Result<CallRequest, SdkError> {
        if burn_amount <= Decimal::ZERO {
            return Err(SdkError::Validation(
                "burn_amount must be positive".to_string(),
            ));
        }
        let params = ExitMarketParams {
            liquidity_engine: self.client.contracts.require_liquidity_engine()?,
            amm: self.client.contracts.amm,
            burn_amount: to_fixed_point(burn_amount, OUTCOME_TOKEN_DECIMALS)?,
            up,
        };
        Ok(build_exit_market_call(holder, &params))
    }
}

//! Constants for the opinion market contracts.
//!
//! Function selectors and event topics are derived from the canonical ABI
//! signatures of the AMM, the ERC-20 tokens and the SmartVoter7702 delegate.

use super::abi::{event_topic, selector};

// ============================================================================
// Decimals
// ============================================================================

/// Fixed-point scale of `getUpPrice()` / `getDownPrice()`.
pub const PRICE_DECIMALS: u32 = 18;

/// Decimals of the UP and DOWN outcome tokens.
pub const OUTCOME_TOKEN_DECIMALS: u32 = 18;

/// Decimals of the stable settlement token (USDC).
pub const STABLE_DECIMALS: u32 = 6;

// ============================================================================
// Signatures
// ============================================================================

/// Canonical ABI signatures.
pub mod signature {
    pub const GET_UP_PRICE: &str = "getUpPrice()";
    pub const GET_DOWN_PRICE: &str = "getDownPrice()";
    pub const UP_RESERVES: &str = "upReserves()";
    pub const DOWN_RESERVES: &str = "downReserves()";
    pub const GET_AMOUNT_OUT: &str = "getAmountOut(uint256,uint256,uint256)";
    pub const BALANCE_OF: &str = "balanceOf(address)";
    pub const ENTER_MARKET: &str = "enterMarket(address,address,address,bool,uint256,uint256)";
    pub const EXIT_MARKET: &str = "exitMarket(address,address,uint256,bool)";
    pub const SWAP_EXECUTED: &str = "SwapExecuted(address,bool,uint256,uint256,uint256)";
}

// ============================================================================
// Selectors & topics
// ============================================================================

lazy_static::lazy_static! {
    /// AMM `getUpPrice()` view
    pub static ref GET_UP_PRICE: [u8; 4] = selector(signature::GET_UP_PRICE);

    /// AMM `getDownPrice()` view
    pub static ref GET_DOWN_PRICE: [u8; 4] = selector(signature::GET_DOWN_PRICE);

    /// AMM `upReserves()` view
    pub static ref UP_RESERVES: [u8; 4] = selector(signature::UP_RESERVES);

    /// AMM `downReserves()` view
    pub static ref DOWN_RESERVES: [u8; 4] = selector(signature::DOWN_RESERVES);

    /// AMM `getAmountOut(amountIn, reserveIn, reserveOut)` pure function
    pub static ref GET_AMOUNT_OUT: [u8; 4] = selector(signature::GET_AMOUNT_OUT);

    /// ERC-20 `balanceOf(owner)`
    pub static ref BALANCE_OF: [u8; 4] = selector(signature::BALANCE_OF);

    /// SmartVoter7702 `enterMarket(...)`
    pub static ref ENTER_MARKET: [u8; 4] = selector(signature::ENTER_MARKET);

    /// SmartVoter7702 `exitMarket(...)`
    pub static ref EXIT_MARKET: [u8; 4] = selector(signature::EXIT_MARKET);

    /// AMM `SwapExecuted` event topic0
    pub static ref SWAP_EXECUTED_TOPIC: [u8; 32] = event_topic(signature::SWAP_EXECUTED);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erc20_balance_of_selector() {
        assert_eq!(hex::encode(*BALANCE_OF), "70a08231");
    }

    #[test]
    fn test_selectors_are_distinct() {
        let all = [
            *GET_UP_PRICE,
            *GET_DOWN_PRICE,
            *UP_RESERVES,
            *DOWN_RESERVES,
            *GET_AMOUNT_OUT,
            *BALANCE_OF,
            *ENTER_MARKET,
            *EXIT_MARKET,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

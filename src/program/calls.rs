//! Call builders for the AMM, ERC-20 tokens and the SmartVoter7702 delegate.
//!
//! Builders only produce `{ to, data }`; signing and broadcasting belong to
//! the wallet layer.

use serde::{Deserialize, Serialize};

use crate::program::abi::{encode_call, word_address, word_bool, word_u128};
use crate::program::constants::{
    BALANCE_OF, DOWN_RESERVES, ENTER_MARKET, EXIT_MARKET, GET_AMOUNT_OUT, GET_DOWN_PRICE,
    GET_UP_PRICE, UP_RESERVES,
};
use crate::shared::serde_util::hex_bytes;
use crate::shared::Address;

/// A contract call: target plus ABI-encoded calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl CallRequest {
    pub fn data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }
}

/// Arguments for `enterMarket`: mint UP+DOWN from stable, then swap into one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterMarketParams {
    pub stable_token: Address,
    pub liquidity_engine: Address,
    pub amm: Address,
    /// `true` to end up holding UP, `false` for DOWN.
    pub up: bool,
    pub stable_amount: u128,
    pub min_amount_out: u128,
}

/// Arguments for `exitMarket`: burn a matched pair back into stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMarketParams {
    pub liquidity_engine: Address,
    pub amm: Address,
    pub burn_amount: u128,
    pub up: bool,
}

// ============================================================================
// View calls
// ============================================================================

pub fn build_get_up_price_call(amm: &Address) -> CallRequest {
    CallRequest {
        to: *amm,
        data: encode_call(*GET_UP_PRICE, &[]),
    }
}

pub fn build_get_down_price_call(amm: &Address) -> CallRequest {
    CallRequest {
        to: *amm,
        data: encode_call(*GET_DOWN_PRICE, &[]),
    }
}

pub fn build_up_reserves_call(amm: &Address) -> CallRequest {
    CallRequest {
        to: *amm,
        data: encode_call(*UP_RESERVES, &[]),
    }
}

pub fn build_down_reserves_call(amm: &Address) -> CallRequest {
    CallRequest {
        to: *amm,
        data: encode_call(*DOWN_RESERVES, &[]),
    }
}

/// Build the AMM's constant-product quote call.
pub fn build_get_amount_out_call(
    amm: &Address,
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> CallRequest {
    CallRequest {
        to: *amm,
        data: encode_call(
            *GET_AMOUNT_OUT,
            &[
                word_u128(amount_in),
                word_u128(reserve_in),
                word_u128(reserve_out),
            ],
        ),
    }
}

pub fn build_balance_of_call(token: &Address, owner: &Address) -> CallRequest {
    CallRequest {
        to: *token,
        data: encode_call(*BALANCE_OF, &[word_address(owner)]),
    }
}

// ============================================================================
// Delegated (EIP-7702) calls
// ============================================================================

/// Build `enterMarket`.
///
/// The call targets the holder's own EOA, which delegates to SmartVoter7702.
pub fn build_enter_market_call(holder: &Address, params: &EnterMarketParams) -> CallRequest {
    CallRequest {
        to: *holder,
        data: encode_call(
            *ENTER_MARKET,
            &[
                word_address(&params.stable_token),
                word_address(&params.liquidity_engine),
                word_address(&params.amm),
                word_bool(params.up),
                word_u128(params.stable_amount),
                word_u128(params.min_amount_out),
            ],
        ),
    }
}

/// Build `exitMarket`, addressed like [`build_enter_market_call`].
pub fn build_exit_market_call(holder: &Address, params: &ExitMarketParams) -> CallRequest {
    CallRequest {
        to: *holder,
        data: encode_call(
            *EXIT_MARKET,
            &[
                word_address(&params.liquidity_engine),
                word_address(&params.amm),
                word_u128(params.burn_amount),
                word_bool(params.up),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::abi::{decode_address, decode_bool, decode_u128, word_at};

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_balance_of_call_encoding() {
        let call = build_balance_of_call(&addr(1), &addr(2));
        assert_eq!(call.to, addr(1));
        assert_eq!(&call.data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(decode_address(word_at(&call.data[4..], 0).unwrap()).unwrap(), addr(2));
    }

    #[test]
    fn test_enter_market_call_argument_order() {
        let params = EnterMarketParams {
            stable_token: addr(1),
            liquidity_engine: addr(2),
            amm: addr(3),
            up: true,
            stable_amount: 5_000_000,
            min_amount_out: 4_000_000_000_000_000_000,
        };
        let call = build_enter_market_call(&addr(9), &params);
        assert_eq!(call.to, addr(9));
        assert_eq!(&call.data[..4], &ENTER_MARKET[..]);

        let args = &call.data[4..];
        assert_eq!(args.len(), 6 * 32);
        assert_eq!(decode_address(word_at(args, 0).unwrap()).unwrap(), addr(1));
        assert_eq!(decode_address(word_at(args, 2).unwrap()).unwrap(), addr(3));
        assert!(decode_bool(word_at(args, 3).unwrap()).unwrap());
        assert_eq!(decode_u128(word_at(args, 4).unwrap()).unwrap(), 5_000_000);
    }

    #[test]
    fn test_exit_market_call_argument_order() {
        let params = ExitMarketParams {
            liquidity_engine: addr(2),
            amm: addr(3),
            burn_amount: 7,
            up: false,
        };
        let call = build_exit_market_call(&addr(9), &params);
        let args = &call.data[4..];
        assert_eq!(args.len(), 4 * 32);
        assert_eq!(decode_u128(word_at(args, 2).unwrap()).unwrap(), 7);
        assert!(!decode_bool(word_at(args, 3).unwrap()).unwrap());
    }

    #[test]
    fn test_call_request_serializes_hex_data() {
        let call = build_get_up_price_call(&addr(0xaa));
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["data"], serde_json::json!(call.data_hex()));
        let back: CallRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, call);
    }
}

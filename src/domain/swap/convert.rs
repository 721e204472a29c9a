//! Conversion: raw `SwapExecuted` log → `SwapEvent`.
//!
//! Layout: `topics = [sig, user]`, `data = isUpToDown ++ amountIn ++ amountOut ++ fee`.

use super::SwapEvent;
use crate::error::AbiError;
use crate::ledger::RawLog;
use crate::program::abi::{decode_address, decode_bool, decode_u128, word_at};
use crate::program::constants::SWAP_EXECUTED_TOPIC;

impl TryFrom<&RawLog> for SwapEvent {
    type Error = AbiError;

    fn try_from(log: &RawLog) -> Result<Self, Self::Error> {
        let topic0 = log.topics.first().ok_or(AbiError::MissingTopic(0))?;
        if topic0 != &*SWAP_EXECUTED_TOPIC {
            return Err(AbiError::UnexpectedTopic(hex::encode(topic0)));
        }
        let user = log.topics.get(1).ok_or(AbiError::MissingTopic(1))?;

        Ok(SwapEvent {
            block_number: log.block_number,
            participant: decode_address(user)?,
            is_up_to_down: decode_bool(word_at(&log.data, 0)?)?,
            amount_in: decode_u128(word_at(&log.data, 1)?)?,
            amount_out: decode_u128(word_at(&log.data, 2)?)?,
            fee: decode_u128(word_at(&log.data, 3)?)?,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
        })
    }
}

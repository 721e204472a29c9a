//! Swap domain — `SwapExecuted` events emitted by the AMM.

pub mod convert;

use serde::{Deserialize, Serialize};

use crate::shared::Address;

/// A finalized trade between the UP and DOWN reserves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub block_number: u64,
    pub participant: Address,
    /// `true` when UP was sold for DOWN.
    pub is_up_to_down: bool,
    pub amount_in: u128,
    pub amount_out: u128,
    pub fee: u128,
    pub transaction_hash: Option<[u8; 32]>,
    pub log_index: Option<u64>,
}

impl SwapEvent {
    /// First block whose state reflects the post-swap reserves.
    ///
    /// Saturates at `u64::MAX`.
    pub fn price_block(&self) -> u64 {
        self.block_number.saturating_add(1)
    }
}

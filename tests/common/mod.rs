//! In-memory ledger for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use opinion_market_sdk::client::{MarketContracts, OpinionClient};
use opinion_market_sdk::error::{AbiError, RpcError};
use opinion_market_sdk::ledger::{BlockHeader, LedgerReader, LogFilter, RawLog};
use opinion_market_sdk::program::abi::{decode_address, decode_u128, word_address, word_at, word_bool, word_u128};
use opinion_market_sdk::program::calls::CallRequest;
use opinion_market_sdk::program::constants::{
    BALANCE_OF, DOWN_RESERVES, GET_AMOUNT_OUT, GET_DOWN_PRICE, GET_UP_PRICE, SWAP_EXECUTED_TOPIC,
    UP_RESERVES,
};
use opinion_market_sdk::shared::Address;

pub const E18: u128 = 1_000_000_000_000_000_000;
pub const GENESIS_TIME: u64 = 1_700_000_000;

pub const AMM: Address = Address::new([0xaa; 20]);
pub const UP_TOKEN: Address = Address::new([0x01; 20]);
pub const DOWN_TOKEN: Address = Address::new([0x02; 20]);
pub const STABLE_TOKEN: Address = Address::new([0x03; 20]);
pub const ENGINE: Address = Address::new([0x04; 20]);
pub const HOLDER: Address = Address::new([0x42; 20]);

pub fn contracts() -> MarketContracts {
    MarketContracts::new(AMM)
        .up_token(UP_TOKEN)
        .down_token(DOWN_TOKEN)
        .stable_token(STABLE_TOKEN)
        .liquidity_engine(ENGINE)
}

pub fn client_for(ledger: &Arc<MockLedger>, max_concurrency: usize) -> OpinionClient {
    OpinionClient::builder()
        .ledger(ledger.clone())
        .contracts(contracts())
        .max_concurrency(max_concurrency)
        .build()
        .unwrap()
}

/// Scriptable chain: a head, swap logs, per-block prices and balances.
pub struct MockLedger {
    head: AtomicU64,
    logs: Mutex<Vec<RawLog>>,
    prices: Mutex<HashMap<u64, (u128, u128)>>,
    default_prices: (u128, u128),
    reserves: (u128, u128),
    balances: Mutex<HashMap<Address, u128>>,
    failing_blocks: Mutex<HashSet<u64>>,
    unavailable: AtomicBool,
    logs_unavailable: AtomicBool,
    /// Heights `getUpPrice` was read at, in call order.
    price_reads: Mutex<Vec<Option<u64>>>,
    log_queries: Mutex<Vec<(u64, u64)>>,
    /// Heights of every `eth_call`, in call order.
    call_heights: Mutex<Vec<Option<u64>>>,
}

impl MockLedger {
    pub fn new(head: u64) -> Self {
        Self {
            head: AtomicU64::new(head),
            logs: Mutex::new(Vec::new()),
            prices: Mutex::new(HashMap::new()),
            default_prices: (E18 / 2, E18 / 2),
            reserves: (100 * E18, 300 * E18),
            balances: Mutex::new(HashMap::new()),
            failing_blocks: Mutex::new(HashSet::new()),
            unavailable: AtomicBool::new(false),
            logs_unavailable: AtomicBool::new(false),
            price_reads: Mutex::new(Vec::new()),
            log_queries: Mutex::new(Vec::new()),
            call_heights: Mutex::new(Vec::new()),
        }
    }

    pub fn with_swaps(self, blocks: &[u64]) -> Self {
        for block in blocks {
            self.add_swap(*block);
        }
        self
    }

    pub fn with_price(self, block: u64, up: u128, down: u128) -> Self {
        self.prices.lock().unwrap().insert(block, (up, down));
        self
    }

    pub fn with_balance(self, token: Address, amount: u128) -> Self {
        self.balances.lock().unwrap().insert(token, amount);
        self
    }

    pub fn add_swap(&self, block: u64) {
        let mut logs = self.logs.lock().unwrap();
        let log_index = logs.iter().filter(|l| l.block_number == block).count() as u64;
        logs.push(RawLog {
            address: AMM,
            topics: vec![*SWAP_EXECUTED_TOPIC, word_address(&HOLDER)],
            data: [word_bool(false), word_u128(E18), word_u128(E18 / 2), word_u128(0)].concat(),
            block_number: block,
            transaction_hash: Some([block as u8; 32]),
            log_index: Some(log_index),
        });
    }

    pub fn add_raw_log(&self, log: RawLog) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub fn fail_block(&self, block: u64) {
        self.failing_blocks.lock().unwrap().insert(block);
    }

    pub fn heal_block(&self, block: u64) {
        self.failing_blocks.lock().unwrap().remove(&block);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail only `eth_getLogs`, leaving point reads working.
    pub fn set_logs_unavailable(&self, unavailable: bool) {
        self.logs_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn price_reads(&self) -> Vec<Option<u64>> {
        self.price_reads.lock().unwrap().clone()
    }

    pub fn call_heights(&self) -> Vec<Option<u64>> {
        self.call_heights.lock().unwrap().clone()
    }

    pub fn log_queries(&self) -> Vec<(u64, u64)> {
        self.log_queries.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), RpcError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RpcError::Unavailable("mock ledger offline".to_string()));
        }
        Ok(())
    }

    fn prices_at(&self, at: Option<u64>) -> (u128, u128) {
        let height = at.unwrap_or_else(|| self.head.load(Ordering::SeqCst));
        self.prices
            .lock()
            .unwrap()
            .get(&height)
            .copied()
            .unwrap_or(self.default_prices)
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn get_block_number(&self) -> Result<u64, RpcError> {
        self.check_available()?;
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_block(&self, height: u64) -> Result<BlockHeader, RpcError> {
        self.check_available()?;
        Ok(BlockHeader {
            number: height,
            timestamp: GENESIS_TIME + height * 12,
        })
    }

    async fn call_view(&self, call: &CallRequest, at: Option<u64>) -> Result<Vec<u8>, RpcError> {
        self.check_available()?;
        self.call_heights.lock().unwrap().push(at);
        if let Some(height) = at {
            if self.failing_blocks.lock().unwrap().contains(&height) {
                return Err(RpcError::Node {
                    code: -32000,
                    message: format!("missing trie node at {}", height),
                });
            }
        }

        let selector: [u8; 4] = call.data[..4]
            .try_into()
            .map_err(|_| RpcError::InvalidResponse("short calldata".to_string()))?;
        let args = &call.data[4..];
        let bad_args = |_: AbiError| RpcError::InvalidResponse("bad calldata".to_string());

        let value = if selector == *GET_UP_PRICE {
            self.price_reads.lock().unwrap().push(at);
            self.prices_at(at).0
        } else if selector == *GET_DOWN_PRICE {
            self.prices_at(at).1
        } else if selector == *UP_RESERVES {
            self.reserves.0
        } else if selector == *DOWN_RESERVES {
            self.reserves.1
        } else if selector == *GET_AMOUNT_OUT {
            let amount_in = decode_u128(word_at(args, 0).map_err(bad_args)?).map_err(bad_args)?;
            let reserve_in = decode_u128(word_at(args, 1).map_err(bad_args)?).map_err(bad_args)?;
            let reserve_out = decode_u128(word_at(args, 2).map_err(bad_args)?).map_err(bad_args)?;
            amount_in * reserve_out / (reserve_in + amount_in)
        } else if selector == *BALANCE_OF {
            let _owner = decode_address(word_at(args, 0).map_err(bad_args)?).map_err(bad_args)?;
            self.balances
                .lock()
                .unwrap()
                .get(&call.to)
                .copied()
                .unwrap_or(0)
        } else {
            return Err(RpcError::Node {
                code: 3,
                message: "execution reverted".to_string(),
            });
        };
        Ok(word_u128(value).to_vec())
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        self.check_available()?;
        if self.logs_unavailable.load(Ordering::SeqCst) {
            return Err(RpcError::Unavailable("log index offline".to_string()));
        }
        self.log_queries
            .lock()
            .unwrap()
            .push((filter.from_block, filter.to_block));
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                log.address == filter.address
                    && log.topics.first() == Some(&filter.topic0)
                    && log.block_number >= filter.from_block
                    && log.block_number <= filter.to_block
            })
            .cloned()
            .collect())
    }
}

//! The read-only ledger accessor.
//!
//! Every domain reads chain state through [`LedgerReader`]. The SDK ships a
//! JSON-RPC implementation (`rpc::JsonRpcLedger`); tests and embedders can
//! supply their own. Implementations never mutate chain state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AbiError, RpcError};
use crate::program::abi::decode_uint_return;
use crate::program::calls::CallRequest;
use crate::shared::{timeout, Address};

/// Block metadata needed by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub number: u64,
    /// Unix seconds.
    pub timestamp: u64,
}

/// Log query: one contract, one event topic, inclusive block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: [u8; 32],
    pub from_block: u64,
    pub to_block: u64,
}

/// An emitted log as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub transaction_hash: Option<[u8; 32]>,
    pub log_index: Option<u64>,
}

/// Read-only access to chain state.
///
/// `at: None` reads the latest state; `Some(height)` reads historical state
/// as of that block, which requires an archive-capable node for old heights.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Current chain head height.
    async fn get_block_number(&self) -> Result<u64, RpcError>;

    /// Header of the block at `height`.
    async fn get_block(&self, height: u64) -> Result<BlockHeader, RpcError>;

    /// Execute a view call and return the raw return data.
    async fn call_view(&self, call: &CallRequest, at: Option<u64>) -> Result<Vec<u8>, RpcError>;

    /// Logs matching `filter`, ordered by block then log index.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError>;
}

/// Run a view call returning a single `uint256`.
pub async fn read_uint<E>(
    ledger: &dyn LedgerReader,
    call: &CallRequest,
    at: Option<u64>,
) -> Result<u128, E>
where
    E: From<RpcError> + From<AbiError>,
{
    let data = ledger.call_view(call, at).await?;
    Ok(decode_uint_return(&data)?)
}

/// Wraps a ledger so every call fails with [`RpcError::Timeout`] past `limit`.
pub struct TimeoutLedger<'a> {
    inner: &'a dyn LedgerReader,
    limit: Duration,
}

impl<'a> TimeoutLedger<'a> {
    pub fn new(inner: &'a dyn LedgerReader, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<'a> LedgerReader for TimeoutLedger<'a> {
    async fn get_block_number(&self) -> Result<u64, RpcError> {
        timeout(self.limit, self.inner.get_block_number())
            .await
            .unwrap_or(Err(RpcError::Timeout))
    }

    async fn get_block(&self, height: u64) -> Result<BlockHeader, RpcError> {
        timeout(self.limit, self.inner.get_block(height))
            .await
            .unwrap_or(Err(RpcError::Timeout))
    }

    async fn call_view(&self, call: &CallRequest, at: Option<u64>) -> Result<Vec<u8>, RpcError> {
        timeout(self.limit, self.inner.call_view(call, at))
            .await
            .unwrap_or(Err(RpcError::Timeout))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        timeout(self.limit, self.inner.get_logs(filter))
            .await
            .unwrap_or(Err(RpcError::Timeout))
    }
}

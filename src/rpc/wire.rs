//! Wire types for Ethereum JSON-RPC requests and responses.

use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::ledger::{BlockHeader, RawLog};
use crate::shared::serde_util::{decode_hex, parse_quantity};
use crate::shared::Address;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response envelope.
///
/// `result` stays untyped so a JSON `null` (e.g. an unknown block) can be
/// told apart from a missing field.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Subset of `eth_getBlockByNumber` the SDK reads.
#[derive(Debug, Deserialize)]
pub struct RpcBlock {
    pub number: String,
    pub timestamp: String,
}

impl TryFrom<RpcBlock> for BlockHeader {
    type Error = RpcError;

    fn try_from(block: RpcBlock) -> Result<Self, Self::Error> {
        Ok(BlockHeader {
            number: parse_quantity(&block.number).map_err(RpcError::InvalidResponse)?,
            timestamp: parse_quantity(&block.timestamp).map_err(RpcError::InvalidResponse)?,
        })
    }
}

/// One entry of an `eth_getLogs` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: Option<String>,
    pub transaction_hash: Option<String>,
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

fn decode_word(s: &str) -> Result<[u8; 32], RpcError> {
    let bytes = decode_hex(s).map_err(RpcError::InvalidResponse)?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| RpcError::InvalidResponse(format!("expected 32-byte hex, got '{}'", s)))
}

impl TryFrom<RpcLog> for RawLog {
    type Error = RpcError;

    fn try_from(log: RpcLog) -> Result<Self, Self::Error> {
        let block_number = log
            .block_number
            .as_deref()
            .ok_or_else(|| RpcError::InvalidResponse("log is still pending".to_string()))
            .and_then(|n| parse_quantity(n).map_err(RpcError::InvalidResponse))?;

        let topics = log
            .topics
            .iter()
            .map(|t| decode_word(t))
            .collect::<Result<Vec<_>, _>>()?;

        let transaction_hash = log
            .transaction_hash
            .as_deref()
            .map(decode_word)
            .transpose()?;

        let log_index = log
            .log_index
            .as_deref()
            .map(|i| parse_quantity(i).map_err(RpcError::InvalidResponse))
            .transpose()?;

        Ok(RawLog {
            address: log.address,
            topics,
            data: decode_hex(&log.data).map_err(RpcError::InvalidResponse)?,
            block_number,
            transaction_hash,
            log_index,
        })
    }
}

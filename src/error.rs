//! Unified SDK error types.

use thiserror::Error;

use crate::shared::ScalingError;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Ledger error: {0}")]
    Rpc(#[from] RpcError),

    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    #[error("Scaling error: {0}")]
    Scaling(#[from] ScalingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error("Timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("{0}")]
    Other(String),
}

/// Ledger-layer errors, raised by any `LedgerReader` implementation.
#[derive(Error, Debug)]
pub enum RpcError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// ABI decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("expected at least {expected} bytes, got {actual}")]
    ShortData { expected: usize, actual: usize },

    #[error("value does not fit in u128")]
    Overflow,

    #[error("invalid bool word")]
    InvalidBool,

    #[error("invalid address word")]
    InvalidAddress,

    #[error("unexpected event topic {0}")]
    UnexpectedTopic(String),

    #[error("missing topic at index {0}")]
    MissingTopic(usize),
}

/// Why a single price point was skipped during reconstruction.
///
/// These never abort a refresh; they are logged and counted.
#[derive(Error, Debug)]
pub enum PointError {
    #[error("ledger read failed: {0}")]
    Ledger(#[from] RpcError),

    #[error("undecodable view result: {0}")]
    Abi(#[from] AbiError),

    #[error("up price is zero at block {0}")]
    DegeneratePrice(u64),

    #[error("block {0} timestamp is out of range")]
    InvalidTimestamp(u64),

    #[error("cancelled")]
    Cancelled,
}

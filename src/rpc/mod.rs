//! JSON-RPC layer — `JsonRpcLedger` with retry policies.

pub mod client;
pub mod retry;
pub mod wire;

pub use client::JsonRpcLedger;
pub use retry::{Backoff, RetryConfig, RetryPolicy};

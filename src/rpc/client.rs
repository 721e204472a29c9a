//! Low-level JSON-RPC client — `JsonRpcLedger`.
//!
//! One method per `eth_*` call the SDK needs. Implements [`LedgerReader`] so
//! the domain layer never sees JSON.

use crate::error::RpcError;
use crate::ledger::{BlockHeader, LedgerReader, LogFilter, RawLog};
use crate::program::calls::CallRequest;
use crate::rpc::retry::RetryPolicy;
use crate::rpc::wire::{RpcBlock, RpcLog, RpcRequest, RpcResponse};
use crate::shared::serde_util::{decode_hex, format_quantity, parse_quantity};
use crate::shared::timeout;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ethereum JSON-RPC ledger accessor over HTTP.
pub struct JsonRpcLedger {
    url: String,
    client: Client,
    retry: RetryPolicy,
    /// Cut-off for a single HTTP round trip; retries get their own.
    attempt_timeout: Option<Duration>,
    request_id: Arc<AtomicU64>,
}

impl JsonRpcLedger {
    /// Create a client for `url`. An empty URL means no endpoint is configured.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RpcError::Unavailable(
                "no JSON-RPC endpoint configured".to_string(),
            ));
        }

        #[allow(unused_mut)]
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Ok(Self {
            url: url.to_string(),
            client: builder.build()?,
            retry: RetryPolicy::Idempotent,
            attempt_timeout: None,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fail an attempt with [`RpcError::Timeout`] after `limit`, which the
    /// retry policy then treats like any other timeout.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    /// Longest one call can take across all of its retries, if attempts are
    /// bounded.
    pub fn max_call_latency(&self) -> Option<Duration> {
        let attempt = self.attempt_timeout?;
        Some(match self.retry.config() {
            Some(config) => config.worst_case(attempt),
            None => attempt,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // ── eth_* ────────────────────────────────────────────────────────────

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let hex: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&hex).map_err(RpcError::InvalidResponse)
    }

    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let hex: String = self.call("eth_chainId", json!([])).await?;
        parse_quantity(&hex).map_err(RpcError::InvalidResponse)
    }

    pub async fn block_by_number(&self, height: u64) -> Result<BlockHeader, RpcError> {
        let block: Option<RpcBlock> = self
            .call(
                "eth_getBlockByNumber",
                json!([format_quantity(height), false]),
            )
            .await?;
        block
            .ok_or_else(|| RpcError::InvalidResponse(format!("block {} not found", height)))?
            .try_into()
    }

    pub async fn eth_call(&self, call: &CallRequest, at: Option<u64>) -> Result<Vec<u8>, RpcError> {
        let tag = at
            .map(format_quantity)
            .unwrap_or_else(|| "latest".to_string());
        let hex: String = self
            .call(
                "eth_call",
                json!([{ "to": call.to, "data": call.data_hex() }, tag]),
            )
            .await?;
        decode_hex(&hex).map_err(RpcError::InvalidResponse)
    }

    pub async fn logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        let logs: Vec<RpcLog> = self
            .call(
                "eth_getLogs",
                json!([{
                    "address": filter.address,
                    "topics": [format!("0x{}", hex::encode(filter.topic0))],
                    "fromBlock": format_quantity(filter.from_block),
                    "toBlock": format_quantity(filter.to_block),
                }]),
            )
            .await?;

        logs.into_iter()
            .filter(|log| !log.removed)
            .map(RawLog::try_from)
            .collect()
    }

    // ── Internal JSON-RPC methods ────────────────────────────────────────

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let Some(config) = self.retry.config() else {
            return self.attempt(method, &params).await;
        };

        let mut retry = 0;
        loop {
            let error = match self.attempt::<T>(method, &params).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            if !config.should_retry(&error) {
                return Err(error);
            }
            if retry >= config.max_retries {
                return Err(RpcError::MaxRetriesExceeded {
                    attempts: retry + 1,
                    last_error: error.to_string(),
                });
            }

            let delay = config.backoff.delay(retry);
            tracing::debug!(
                retry = retry + 1,
                max = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying {} against {}",
                method,
                self.url
            );
            futures_timer::Delay::new(delay).await;
            retry += 1;
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, RpcError> {
        match self.attempt_timeout {
            Some(limit) => timeout(limit, self.do_call(method, params))
                .await
                .unwrap_or(Err(RpcError::Timeout)),
            None => self.do_call(method, params).await,
        }
    }

    async fn do_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: params.clone(),
        };

        let resp = self.client.post(&self.url).json(&request).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(match status_code {
                429 => RpcError::RateLimited,
                _ => RpcError::Status {
                    status: status_code,
                    body,
                },
            });
        }

        let envelope = resp.json::<RpcResponse>().await?;
        if let Some(err) = envelope.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }

        let result = envelope.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

impl Clone for JsonRpcLedger {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            client: self.client.clone(),
            retry: self.retry.clone(),
            attempt_timeout: self.attempt_timeout,
            request_id: self.request_id.clone(),
        }
    }
}

#[async_trait]
impl LedgerReader for JsonRpcLedger {
    async fn get_block_number(&self) -> Result<u64, RpcError> {
        self.block_number().await
    }

    async fn get_block(&self, height: u64) -> Result<BlockHeader, RpcError> {
        self.block_by_number(height).await
    }

    async fn call_view(&self, call: &CallRequest, at: Option<u64>) -> Result<Vec<u8>, RpcError> {
        self.eth_call(call, at).await
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        self.logs(filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::retry::{Backoff, RetryConfig};

    /// Accepts connections but never answers.
    fn silent_endpoint() -> (std::net::TcpListener, String) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    fn quick_retries(max_retries: u32) -> RetryPolicy {
        RetryPolicy::Custom(RetryConfig {
            max_retries,
            backoff: Backoff {
                initial: Duration::from_millis(5),
                max: Duration::from_millis(5),
                factor: 1.0,
                jitter: false,
            },
            ..RetryConfig::idempotent()
        })
    }

    #[tokio::test]
    async fn test_stalled_attempt_times_out_without_retries() {
        let (_listener, url) = silent_endpoint();
        let ledger = JsonRpcLedger::new(&url)
            .unwrap()
            .with_retry(RetryPolicy::None)
            .with_attempt_timeout(Duration::from_millis(50));
        assert!(matches!(
            ledger.block_number().await,
            Err(RpcError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_stalled_attempts_are_each_retried() {
        let (_listener, url) = silent_endpoint();
        let ledger = JsonRpcLedger::new(&url)
            .unwrap()
            .with_retry(quick_retries(2))
            .with_attempt_timeout(Duration::from_millis(50));
        match ledger.block_number().await {
            Err(RpcError::MaxRetriesExceeded { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected MaxRetriesExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_max_call_latency_spans_retries() {
        let ledger = JsonRpcLedger::new("http://localhost:8545").unwrap();
        assert_eq!(ledger.max_call_latency(), None);

        let ledger = ledger
            .with_retry(quick_retries(2))
            .with_attempt_timeout(Duration::from_secs(1));
        assert_eq!(
            ledger.max_call_latency(),
            Some(Duration::from_millis(3010))
        );

        let ledger = ledger.with_retry(RetryPolicy::None);
        assert_eq!(ledger.max_call_latency(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_empty_url_is_unavailable() {
        assert!(matches!(
            JsonRpcLedger::new("  "),
            Err(RpcError::Unavailable(_))
        ));
    }

    #[test]
    fn test_request_envelope_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_blockNumber",
            params: json!([]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "id": 7, "method": "eth_blockNumber", "params": [] })
        );
    }

    #[test]
    fn test_node_error_envelope_parses() {
        let envelope: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "missing trie node" }
        }))
        .unwrap();
        let err = envelope.error.unwrap();
        assert_eq!(err.code, -32000);
        assert!(envelope.result.is_none());
    }
}

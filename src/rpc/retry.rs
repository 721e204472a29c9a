//! When and how often a failed JSON-RPC read is re-sent.
//!
//! Every read the SDK issues is a pure view, so a failure that says "try
//! again later" is safe to repeat. Besides transport drops and gateway
//! statuses that covers providers that throttle inside a 200 response with a
//! JSON-RPC error object. Deterministic node errors (reverts, pruned state)
//! are never retried.

use std::time::Duration;

use crate::error::RpcError;

/// Retry policy for a ledger request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Fail on the first error.
    None,
    /// [`RetryConfig::idempotent`].
    #[default]
    Idempotent,
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// The effective config, or `None` when retries are disabled.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::idempotent()),
            RetryPolicy::Custom(c) => Some(c.clone()),
        }
    }
}

/// Capped exponential backoff between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
    /// Spread each delay by up to ±25%.
    pub jitter: bool,
}

impl Backoff {
    /// Delay before retry number `retry` (0 = first retry), before jitter.
    pub fn base(&self, retry: u32) -> Duration {
        let ms = self.initial.as_millis() as f64 * self.factor.powi(retry as i32);
        Duration::from_millis(ms.min(self.max.as_millis() as f64) as u64)
    }

    /// Delay before retry number `retry`, jitter applied.
    pub fn delay(&self, retry: u32) -> Duration {
        let base = self.base(retry);
        if !self.jitter {
            return base;
        }
        let spread = 0.75 + rand::random::<f64>() * 0.5;
        base.mul_f64(spread)
    }

    /// Longest [`Self::delay`] can be for `retry`.
    pub fn ceiling(&self, retry: u32) -> Duration {
        if self.jitter {
            self.base(retry).mul_f64(1.25)
        } else {
            self.base(retry)
        }
    }
}

/// Which failures are retried, how many times, and how far apart.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// HTTP statuses from the endpoint.
    pub retry_statuses: Vec<u16>,
    /// JSON-RPC `error.code` values.
    pub retry_node_codes: Vec<i64>,
    /// Lowercase fragments of a JSON-RPC `error.message`, for providers that
    /// throttle under a generic code.
    pub retry_node_messages: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    /// Three retries from 250ms doubling to a 5s cap, with jitter.
    ///
    /// Retries 429/502/503/504, node code `-32005` (limit exceeded) and
    /// `429`, and throttling or lagging-backend messages.
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff {
                initial: Duration::from_millis(250),
                max: Duration::from_secs(5),
                factor: 2.0,
                jitter: true,
            },
            retry_statuses: vec![429, 502, 503, 504],
            retry_node_codes: vec![-32005, 429],
            retry_node_messages: ["rate limit", "too many requests", "header not found"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn should_retry(&self, error: &RpcError) -> bool {
        match error {
            RpcError::RateLimited | RpcError::Timeout => true,
            RpcError::Status { status, .. } => self.retry_statuses.contains(status),
            RpcError::Node { code, message } => {
                if self.retry_node_codes.contains(code) {
                    return true;
                }
                let message = message.to_ascii_lowercase();
                self.retry_node_messages
                    .iter()
                    .any(|fragment| message.contains(fragment.as_str()))
            }
            RpcError::Reqwest(e) => is_transient(e),
            _ => false,
        }
    }

    /// Upper bound on one call including every retry, when each attempt is
    /// cut off at `attempt_timeout`.
    pub fn worst_case(&self, attempt_timeout: Duration) -> Duration {
        let attempts = attempt_timeout.saturating_mul(self.max_retries.saturating_add(1));
        (0..self.max_retries)
            .map(|retry| self.backoff.ceiling(retry))
            .fold(attempts, Duration::saturating_add)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request()
}

#[cfg(target_arch = "wasm32")]
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_request()
}

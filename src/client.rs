//! High-level client — `OpinionClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the market's contract set, shared price
//! history state, and accessor methods.

use crate::domain::market::client::Markets;
use crate::domain::position::client::Positions;
use crate::domain::price_history::client::PriceHistoryClient;
use crate::domain::price_history::reconstruct::{ReconstructOptions, Reconstructor};
use crate::domain::price_history::PriceHistoryState;
use crate::error::SdkError;
use crate::ledger::{LedgerReader, TimeoutLedger};
use crate::network::DEFAULT_BACKING_MULTIPLIER;
use crate::shared::Address;

use async_lock::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "http")]
use crate::rpc::{JsonRpcLedger, RetryPolicy};

// Re-export sub-client types for convenience.
pub use crate::domain::market::client::Markets as MarketsClient;
pub use crate::domain::position::client::Positions as PositionsClient;
pub use crate::domain::price_history::client::PriceHistoryClient as PriceHistorySubClient;

// ═════════════════════════════════════════════════════════════════════════════
// Contracts
// ═════════════════════════════════════════════════════════════════════════════

/// Addresses of one market's contracts.
///
/// Only the AMM is needed for price reads; token and engine addresses are
/// required by balance reads and entry/exit calldata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContracts {
    pub amm: Address,
    #[serde(default)]
    pub up_token: Option<Address>,
    #[serde(default)]
    pub down_token: Option<Address>,
    #[serde(default)]
    pub stable_token: Option<Address>,
    #[serde(default)]
    pub liquidity_engine: Option<Address>,
    /// Delegate code holders point their EOA at (EIP-7702).
    #[serde(default)]
    pub smart_voter: Option<Address>,
}

impl MarketContracts {
    pub fn new(amm: Address) -> Self {
        Self {
            amm,
            ..Default::default()
        }
    }

    pub fn up_token(mut self, address: Address) -> Self {
        self.up_token = Some(address);
        self
    }

    pub fn down_token(mut self, address: Address) -> Self {
        self.down_token = Some(address);
        self
    }

    pub fn stable_token(mut self, address: Address) -> Self {
        self.stable_token = Some(address);
        self
    }

    pub fn liquidity_engine(mut self, address: Address) -> Self {
        self.liquidity_engine = Some(address);
        self
    }

    pub fn smart_voter(mut self, address: Address) -> Self {
        self.smart_voter = Some(address);
        self
    }

    pub(crate) fn require_up_token(&self) -> Result<Address, SdkError> {
        require(self.up_token, "up_token")
    }

    pub(crate) fn require_down_token(&self) -> Result<Address, SdkError> {
        require(self.down_token, "down_token")
    }

    pub(crate) fn require_stable_token(&self) -> Result<Address, SdkError> {
        require(self.stable_token, "stable_token")
    }

    pub(crate) fn require_liquidity_engine(&self) -> Result<Address, SdkError> {
        require(self.liquidity_engine, "liquidity_engine")
    }
}

fn require(address: Option<Address>, name: &str) -> Result<Address, SdkError> {
    address.ok_or_else(|| SdkError::Validation(format!("{} address not configured", name)))
}

// ═════════════════════════════════════════════════════════════════════════════
// Client
// ═════════════════════════════════════════════════════════════════════════════

/// The primary entry point for the Opinion Market SDK.
///
/// Provides nested sub-client accessors for each domain:
/// `client.markets()`, `client.price_history()`, `client.positions()`.
/// Clones share the ledger and the price history.
pub struct OpinionClient {
    pub(crate) ledger: Arc<dyn LedgerReader>,
    pub(crate) contracts: MarketContracts,
    pub(crate) options: ReconstructOptions,
    pub(crate) backing_multiplier: Decimal,
    /// Reconstructed history for `contracts.amm`.
    pub(crate) price_history: Arc<RwLock<PriceHistoryState>>,
    /// Held for the whole of a refresh.
    pub(crate) refresh_lock: Arc<Mutex<()>>,
}

impl OpinionClient {
    pub fn builder() -> OpinionClientBuilder {
        OpinionClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn markets(&self) -> Markets<'_> {
        Markets { client: self }
    }

    pub fn price_history(&self) -> PriceHistoryClient<'_> {
        PriceHistoryClient { client: self }
    }

    pub fn positions(&self) -> Positions<'_> {
        Positions { client: self }
    }

    pub fn contracts(&self) -> &MarketContracts {
        &self.contracts
    }

    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    pub fn backing_multiplier(&self) -> Decimal {
        self.backing_multiplier
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// The ledger with the per-call timeout applied.
    pub(crate) fn reader(&self) -> TimeoutLedger<'_> {
        TimeoutLedger::new(self.ledger.as_ref(), self.options.call_timeout)
    }

    pub(crate) fn reconstructor(&self) -> Reconstructor<'_> {
        Reconstructor::new(
            self.ledger.as_ref(),
            self.contracts.amm,
            self.options.clone(),
        )
    }
}

impl Clone for OpinionClient {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            contracts: self.contracts.clone(),
            options: self.options.clone(),
            backing_multiplier: self.backing_multiplier,
            price_history: self.price_history.clone(),
            refresh_lock: self.refresh_lock.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct OpinionClientBuilder {
    #[cfg(feature = "http")]
    rpc_url: String,
    #[cfg(feature = "http")]
    retry: RetryPolicy,
    ledger: Option<Arc<dyn LedgerReader>>,
    contracts: Option<MarketContracts>,
    options: ReconstructOptions,
    backing_multiplier: Decimal,
}

impl Default for OpinionClientBuilder {
    fn default() -> Self {
        Self {
            #[cfg(feature = "http")]
            rpc_url: crate::network::DEFAULT_RPC_URL.to_string(),
            #[cfg(feature = "http")]
            retry: RetryPolicy::Idempotent,
            ledger: None,
            contracts: None,
            options: ReconstructOptions::default(),
            backing_multiplier: Decimal::from(DEFAULT_BACKING_MULTIPLIER),
        }
    }
}

impl OpinionClientBuilder {
    /// JSON-RPC endpoint. Ignored when a ledger is injected with [`Self::ledger`].
    #[cfg(feature = "http")]
    pub fn rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = url.to_string();
        self
    }

    /// Retry policy for the JSON-RPC ledger.
    #[cfg(feature = "http")]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read through a caller-supplied ledger instead of JSON-RPC.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerReader>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn contracts(mut self, contracts: MarketContracts) -> Self {
        self.contracts = Some(contracts);
        self
    }

    pub fn lookback_blocks(mut self, blocks: u64) -> Self {
        self.options.lookback_blocks = blocks;
        self
    }

    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.options.max_concurrency = limit;
        self
    }

    pub fn call_timeout(mut self, limit: Duration) -> Self {
        self.options.call_timeout = limit;
        self
    }

    pub fn refresh_budget(mut self, budget: Duration) -> Self {
        self.options.refresh_budget = budget;
        self
    }

    /// Stable value of one matched UP + DOWN pair.
    pub fn backing_multiplier(mut self, multiplier: Decimal) -> Self {
        self.backing_multiplier = multiplier;
        self
    }

    pub fn build(self) -> Result<OpinionClient, SdkError> {
        let amm = self
            .contracts
            .as_ref()
            .map(|c| c.amm)
            .ok_or_else(|| SdkError::Validation("market contracts not configured".to_string()))?;
        if amm == Address::ZERO {
            return Err(SdkError::Validation(
                "AMM address not configured".to_string(),
            ));
        }
        if self.options.max_concurrency == 0 {
            return Err(SdkError::Validation(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.options.call_timeout.is_zero() || self.options.refresh_budget.is_zero() {
            return Err(SdkError::Validation(
                "timeouts must be non-zero".to_string(),
            ));
        }
        if self.backing_multiplier <= Decimal::ZERO {
            return Err(SdkError::Validation(
                "backing_multiplier must be positive".to_string(),
            ));
        }

        let (ledger, call_timeout) = match &self.ledger {
            Some(ledger) => (ledger.clone(), self.options.call_timeout),
            None => self.default_ledger()?,
        };
        let contracts = self.contracts.unwrap_or_default();

        Ok(OpinionClient {
            ledger,
            contracts,
            options: ReconstructOptions {
                call_timeout,
                ..self.options
            },
            backing_multiplier: self.backing_multiplier,
            price_history: Arc::new(RwLock::new(PriceHistoryState::new())),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The JSON-RPC ledger, plus the per-call limit to wrap it in.
    ///
    /// `call_timeout` bounds each HTTP attempt; the outer limit is widened to
    /// the worst case across retries so it never cuts a retry short.
    #[cfg(feature = "http")]
    fn default_ledger(&self) -> Result<(Arc<dyn LedgerReader>, Duration), SdkError> {
        let ledger = JsonRpcLedger::new(&self.rpc_url)
            .map_err(|e| SdkError::Validation(format!("invalid rpc_url: {}", e)))?
            .with_retry(self.retry.clone())
            .with_attempt_timeout(self.options.call_timeout);
        let call_limit = ledger
            .max_call_latency()
            .unwrap_or(self.options.call_timeout);
        Ok((Arc::new(ledger), call_limit))
    }

    #[cfg(not(feature = "http"))]
    fn default_ledger(&self) -> Result<(Arc<dyn LedgerReader>, Duration), SdkError> {
        Err(SdkError::Validation(
            "no ledger configured; enable the `http` feature or call .ledger()".to_string(),
        ))
    }
}

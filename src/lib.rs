//! # Opinion Market SDK
//!
//! A Rust SDK for reading UP/DOWN opinion markets backed by an on-chain AMM.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, fixed-point scaling, ABI encoding (always available, WASM-safe)
//! 2. **Ledger** — `LedgerReader`, the read-only chain accessor every domain reads through
//! 3. **JSON-RPC** — `JsonRpcLedger`, an `eth_*` implementation with retry policies
//! 4. **Domain** — Swaps, market reads, price history reconstruction, position valuation
//! 5. **High-Level Client** — `OpinionClient` with nested sub-clients and shared state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opinion_market_sdk::prelude::*;
//!
//! let client = OpinionClient::builder()
//!     .rpc_url("https://ethereum-sepolia-rpc.publicnode.com")
//!     .contracts(MarketContracts::new(amm))
//!     .build()?;
//!
//! let report = client.price_history().fetch(None, None, &CancelToken::new()).await?;
//! let latest = client.price_history().latest().await;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Contract interaction: selectors, ABI words, calldata builders.
pub mod program;

/// Unified SDK error types.
pub mod error;

/// Network and market defaults.
pub mod network;

// ── Layer 2: Ledger ──────────────────────────────────────────────────────────

/// The read-only ledger accessor.
pub mod ledger;

// ── Layer 3: JSON-RPC ────────────────────────────────────────────────────────

/// JSON-RPC ledger client with retry policies.
#[cfg(feature = "http")]
pub mod rpc;

// ── Layer 4: Domain ──────────────────────────────────────────────────────────

/// Domain modules (vertical slices): types, conversions, state, sub-clients.
pub mod domain;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `OpinionClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Address, BlockRange, CancelToken};

    // Domain types — swaps, market
    pub use crate::domain::market::{MarketSnapshot, RawPricePair, ReservePair};
    pub use crate::domain::swap::SwapEvent;

    // Domain types — price history
    pub use crate::domain::price_history::reconstruct::{
        ReconstructOptions, Reconstruction, Reconstructor,
    };
    pub use crate::domain::price_history::{PricePoint, PriceHistoryState, RefreshReport};

    // Domain types — position
    pub use crate::domain::position::{PositionValuation, TokenBalances};

    // Calldata
    pub use crate::program::calls::CallRequest;

    // Errors
    pub use crate::error::{AbiError, PointError, RpcError, SdkError};

    // Ledger
    pub use crate::ledger::{BlockHeader, LedgerReader, LogFilter, RawLog};

    // Network
    pub use crate::network::{DEFAULT_LOOKBACK_BLOCKS, DEFAULT_RPC_URL};

    // Client + sub-clients
    pub use crate::client::{
        MarketContracts, MarketsClient, OpinionClient, OpinionClientBuilder,
        PositionsClient, PriceHistorySubClient,
    };

    #[cfg(feature = "http")]
    pub use crate::rpc::{JsonRpcLedger, RetryConfig, RetryPolicy};
}

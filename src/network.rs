//! Network and market defaults for the Opinion Market SDK.

/// Default JSON-RPC endpoint (Sepolia).
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

/// Sepolia chain id.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Blocks scanned back from the head when no `from_block` is given.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 1000;

/// Stable value backing one UP + one DOWN token pair.
pub const DEFAULT_BACKING_MULTIPLIER: u32 = 2;

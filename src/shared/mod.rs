//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: an `Address` serializes as the
//! same `0x`-prefixed hex string the node sends, so it can be used directly in
//! config files and wire types without conversion overhead.

pub mod scaling;
pub mod serde_util;
pub mod timeout;

pub use scaling::{from_fixed_point, to_fixed_point, ScalingError};
pub use timeout::{timeout, Elapsed};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ─── Address ─────────────────────────────────────────────────────────────────

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(format!("address must be 40 hex digits, got {}", digits.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| e.to_string())?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ─── BlockRange ──────────────────────────────────────────────────────────────

/// An inclusive block height range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub from_block: u64,
    pub to_block: u64,
}

impl BlockRange {
    /// Build a range, rejecting `from_block > to_block`.
    pub fn new(from_block: u64, to_block: u64) -> Result<Self, String> {
        if from_block > to_block {
            return Err(format!(
                "from_block {} is after to_block {}",
                from_block, to_block
            ));
        }
        Ok(Self {
            from_block,
            to_block,
        })
    }

    /// Resolve optional bounds against the chain head.
    ///
    /// `to_block` defaults to `head`, `from_block` to `to_block - lookback`
    /// (saturating at genesis).
    pub fn resolve(
        from_block: Option<u64>,
        to_block: Option<u64>,
        head: u64,
        lookback: u64,
    ) -> Result<Self, String> {
        let to_block = to_block.unwrap_or(head);
        let from_block = from_block.unwrap_or_else(|| to_block.saturating_sub(lookback));
        Self::new(from_block, to_block)
    }

    pub fn contains(&self, block: u64) -> bool {
        (self.from_block..=self.to_block).contains(&block)
    }

    /// Number of blocks covered, both ends included.
    pub fn block_count(&self) -> u64 {
        self.to_block - self.from_block + 1
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from_block, self.to_block)
    }
}

// ─── CancelToken ─────────────────────────────────────────────────────────────

/// Caller-held cancellation flag for long-running refreshes.
///
/// Clones share the same flag. Work checks it before every ledger read.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_roundtrips_through_json() {
        let addr: Address = "0x00000000000000000000000000000000000000aB".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x00000000000000000000000000000000000000ab\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz00000000000000000000000000000000000000".parse::<Address>().is_err());
    }

    #[test]
    fn test_block_range_resolves_defaults() {
        let range = BlockRange::resolve(None, None, 5000, 1000).unwrap();
        assert_eq!(range, BlockRange { from_block: 4000, to_block: 5000 });

        let range = BlockRange::resolve(None, Some(300), 5000, 1000).unwrap();
        assert_eq!(range.from_block, 0);
        assert_eq!(range.to_block, 300);
    }

    #[test]
    fn test_block_range_rejects_inverted_bounds() {
        assert!(BlockRange::new(10, 9).is_err());
        assert!(BlockRange::resolve(Some(600), None, 500, 1000).is_err());
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}

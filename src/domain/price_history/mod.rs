//! Price history domain — UP-token valuations reconstructed from swaps.

pub mod client;
pub mod reconstruct;
pub mod state;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::BlockRange;

pub use state::PriceHistoryState;

/// Display format for chart axes.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Implied USD value of one UP token, sampled one block after a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Always finite and within `[0, 1]`.
    pub up_price_usd: f64,
    /// Unix seconds of `block_number`.
    pub timestamp: u64,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub formatted_date: String,
    /// Block the price was read at.
    pub block_number: u64,
    /// Block of the swap that produced this price.
    pub swap_block_number: u64,
}

impl PricePoint {
    pub fn down_price_usd(&self) -> f64 {
        1.0 - self.up_price_usd
    }
}

/// Format unix seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(timestamp: u64) -> Option<String> {
    let secs = i64::try_from(timestamp).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(DATE_FORMAT).to_string())
}

/// A price block that produced no point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPoint {
    pub block_number: u64,
    pub reason: String,
}

/// Summary of one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub range: BlockRange,
    pub swaps_seen: usize,
    /// Points newly merged into state (duplicates excluded).
    pub points_added: usize,
    /// The points behind `points_added`, ascending. Backfilled gaps can sit
    /// below the previous latest block.
    pub added: Vec<PricePoint>,
    pub skipped: Vec<SkippedPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_700_000_000).as_deref(),
            Some("2023-11-14 22:13:20")
        );
        assert_eq!(format_timestamp(0).as_deref(), Some("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp(u64::MAX), None);
    }
}

//! Price history reconstruction from on-chain swap events.
//!
//! For every `SwapExecuted` log in a block range, the AMM's prices are read
//! one block later (the first state reflecting the post-swap reserves) and
//! turned into a [`PricePoint`]. Failures on individual points are logged and
//! skipped; only failures of the head or log queries abort the run.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use super::{format_timestamp, PricePoint, SkippedPoint};
use crate::domain::market::{read_price_pair, RawPricePair};
use crate::domain::swap::SwapEvent;
use crate::error::{PointError, SdkError};
use crate::ledger::{LedgerReader, LogFilter, TimeoutLedger};
use crate::network::DEFAULT_LOOKBACK_BLOCKS;
use crate::program::constants::SWAP_EXECUTED_TOPIC;
use crate::shared::{timeout, Address, BlockRange, CancelToken};

/// Tuning for a reconstruction run.
#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    /// Blocks scanned back from `to_block` when `from_block` is omitted.
    pub lookback_blocks: u64,
    /// Price points resolved concurrently. `1` is strictly sequential.
    pub max_concurrency: usize,
    /// Limit for each individual ledger call, including any retries the
    /// ledger makes underneath. A client built on JSON-RPC applies the
    /// configured value per HTTP attempt and widens this to cover retries.
    pub call_timeout: Duration,
    /// Limit for the whole run.
    pub refresh_budget: Duration,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
            max_concurrency: 4,
            call_timeout: Duration::from_secs(10),
            refresh_budget: Duration::from_secs(120),
        }
    }
}

/// Output of one run, before it is merged into any state.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub range: BlockRange,
    /// Decoded swaps in block order.
    pub swaps: Vec<SwapEvent>,
    /// One point per distinct price block, ascending.
    pub points: Vec<PricePoint>,
    pub skipped: Vec<SkippedPoint>,
    /// Highest block whose swaps are final in this run. Lower than
    /// `range.to_block` when the point for a swap in the last block could
    /// not be read.
    pub complete_through: u64,
}

/// Rebuilds UP-token price history for one AMM.
pub struct Reconstructor<'a> {
    ledger: TimeoutLedger<'a>,
    amm: Address,
    options: ReconstructOptions,
}

impl<'a> Reconstructor<'a> {
    pub fn new(ledger: &'a dyn LedgerReader, amm: Address, options: ReconstructOptions) -> Self {
        Self {
            ledger: TimeoutLedger::new(ledger, options.call_timeout),
            amm,
            options,
        }
    }

    /// Reconstruct points for `[from_block, to_block]`.
    ///
    /// `to_block` defaults to the chain head and `from_block` to
    /// `to_block - lookback_blocks`.
    pub async fn run(
        &self,
        from_block: Option<u64>,
        to_block: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<Reconstruction, SdkError> {
        if let (Some(from), Some(to)) = (from_block, to_block) {
            BlockRange::new(from, to).map_err(SdkError::Validation)?;
        }

        let budget = self.options.refresh_budget;
        timeout(budget, self.run_unbounded(from_block, to_block, cancel))
            .await
            .unwrap_or(Err(SdkError::Timeout {
                elapsed_ms: budget.as_millis() as u64,
            }))
    }

    async fn run_unbounded(
        &self,
        from_block: Option<u64>,
        to_block: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<Reconstruction, SdkError> {
        if cancel.is_cancelled() {
            return Err(SdkError::Cancelled);
        }

        let head = match to_block {
            Some(_) => None,
            None => Some(self.ledger.get_block_number().await?),
        };
        let range = BlockRange::resolve(
            from_block,
            to_block,
            head.unwrap_or_default(),
            self.options.lookback_blocks,
        )
        .map_err(SdkError::Validation)?;

        if cancel.is_cancelled() {
            return Err(SdkError::Cancelled);
        }

        let swaps = self.fetch_swaps(&range).await?;

        // Several swaps in one block share a price block.
        let mut jobs: Vec<(u64, u64)> = swaps
            .iter()
            .map(|s| (s.price_block(), s.block_number))
            .collect();
        jobs.dedup_by_key(|(price_block, _)| *price_block);

        let concurrency = self.options.max_concurrency.max(1);
        let outcomes: Vec<(u64, Result<PricePoint, PointError>)> = stream::iter(jobs)
            .map(|(price_block, swap_block)| async move {
                (
                    price_block,
                    self.point_at(price_block, swap_block, cancel).await,
                )
            })
            .buffered(concurrency)
            .collect()
            .await;

        if cancel.is_cancelled() {
            return Err(SdkError::Cancelled);
        }

        let mut points = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (block_number, outcome) in outcomes {
            match outcome {
                Ok(point) => points.push(point),
                Err(e) => {
                    tracing::warn!(block_number, error = %e, "Skipping price point");
                    skipped.push(SkippedPoint {
                        block_number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // A swap in the last block may have no successor block yet; leave it
        // for the next run instead of losing it.
        let edge_price_block = range.to_block.saturating_add(1);
        let complete_through = if skipped.iter().any(|s| s.block_number == edge_price_block) {
            range.to_block.saturating_sub(1)
        } else {
            range.to_block
        };

        tracing::info!(
            range = %range,
            swaps = swaps.len(),
            points = points.len(),
            skipped = skipped.len(),
            "Reconstructed price history"
        );

        Ok(Reconstruction {
            range,
            swaps,
            points,
            skipped,
            complete_through,
        })
    }

    /// Decoded `SwapExecuted` events in `range`, in block order.
    pub async fn fetch_swaps(&self, range: &BlockRange) -> Result<Vec<SwapEvent>, SdkError> {
        let filter = LogFilter {
            address: self.amm,
            topic0: *SWAP_EXECUTED_TOPIC,
            from_block: range.from_block,
            to_block: range.to_block,
        };
        let logs = self.ledger.get_logs(&filter).await?;

        let mut swaps: Vec<SwapEvent> = logs
            .iter()
            .filter_map(|log| match SwapEvent::try_from(log) {
                Ok(swap) => Some(swap),
                Err(e) => {
                    tracing::warn!(
                        block_number = log.block_number,
                        error = %e,
                        "Ignoring undecodable SwapExecuted log"
                    );
                    None
                }
            })
            .collect();
        swaps.sort_by_key(|s| (s.block_number, s.log_index));
        Ok(swaps)
    }

    /// Sample the price at `price_block`, attributing it to `swap_block`.
    pub async fn point_at(
        &self,
        price_block: u64,
        swap_block: u64,
        cancel: &CancelToken,
    ) -> Result<PricePoint, PointError> {
        if cancel.is_cancelled() {
            return Err(PointError::Cancelled);
        }
        let prices: RawPricePair =
            read_price_pair::<PointError>(&self.ledger, &self.amm, Some(price_block)).await?;
        let up_price_usd = prices
            .up_price_usd()
            .ok_or(PointError::DegeneratePrice(price_block))?;

        if cancel.is_cancelled() {
            return Err(PointError::Cancelled);
        }
        let header = self.ledger.get_block(price_block).await?;
        let formatted_date =
            format_timestamp(header.timestamp).ok_or(PointError::InvalidTimestamp(price_block))?;

        tracing::debug!(price_block, swap_block, up_price_usd, "Sampled price");

        Ok(PricePoint {
            up_price_usd,
            timestamp: header.timestamp,
            formatted_date,
            block_number: price_block,
            swap_block_number: swap_block,
        })
    }
}

//! Price history sub-client — refreshes and reads the client's shared history.

use futures_util::Stream;
use std::time::Duration;

use super::{PricePoint, RefreshReport, SkippedPoint};
use crate::client::OpinionClient;
use crate::domain::price_history::reconstruct::Reconstruction;
use crate::error::{PointError, SdkError};
use crate::ledger::LedgerReader;
use crate::shared::{BlockRange, CancelToken};

/// Sub-client for price history operations.
///
/// Refreshes are serialized: a second refresh waits for the one in flight,
/// then merges (a no-op for overlapping ranges).
pub struct PriceHistoryClient<'a> {
    pub(crate) client: &'a OpinionClient,
}

impl<'a> PriceHistoryClient<'a> {
    /// Reconstruct `[from_block, to_block]` and merge into the shared history.
    pub async fn fetch(
        &self,
        from_block: Option<u64>,
        to_block: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<RefreshReport, SdkError> {
        let _guard = self.client.refresh_lock.lock().await;
        self.fetch_locked(from_block, to_block, cancel).await
    }

    /// Sample the head price, then reconstruct the lookback window ending at
    /// that head.
    ///
    /// A head sample that fails is reported in `skipped` like any other
    /// point. Nothing is merged unless the window run succeeds.
    pub async fn refresh_recent(&self, cancel: &CancelToken) -> Result<RefreshReport, SdkError> {
        let _guard = self.client.refresh_lock.lock().await;

        let head = self.client.reader().get_block_number().await?;
        let head_sample = match self
            .client
            .reconstructor()
            .point_at(head, head.saturating_sub(1), cancel)
            .await
        {
            Ok(point) => Ok(point),
            Err(PointError::Cancelled) => return Err(SdkError::Cancelled),
            Err(e) => {
                tracing::warn!(block_number = head, error = %e, "Skipping head price point");
                Err(SkippedPoint {
                    block_number: head,
                    reason: e.to_string(),
                })
            }
        };

        let mut report = self.fetch_locked(None, Some(head), cancel).await?;
        match head_sample {
            Ok(point) => {
                if self.client.price_history.write().await.insert(point.clone()) {
                    report.points_added += 1;
                    report.added.push(point);
                    report.added.sort_by_key(|p| p.block_number);
                }
            }
            Err(skipped) => {
                if !report.skipped.iter().any(|s| s.block_number == head) {
                    report.skipped.push(skipped);
                }
            }
        }
        Ok(report)
    }

    /// Scan only blocks after the last fully scanned one, up to the head.
    ///
    /// With no prior scan this is the default lookback window.
    pub async fn fetch_new(&self, cancel: &CancelToken) -> Result<RefreshReport, SdkError> {
        let _guard = self.client.refresh_lock.lock().await;

        let scanned = self.client.price_history.read().await.scanned_to();
        let Some(scanned_to) = scanned else {
            return self.fetch_locked(None, None, cancel).await;
        };

        let head = self.client.reader().get_block_number().await?;
        let from_block = scanned_to.saturating_add(1);
        if from_block > head {
            return Ok(RefreshReport {
                range: BlockRange {
                    from_block: head,
                    to_block: head,
                },
                swaps_seen: 0,
                points_added: 0,
                added: Vec::new(),
                skipped: Vec::new(),
            });
        }
        self.fetch_locked(Some(from_block), Some(head), cancel).await
    }

    /// Re-run [`Self::fetch_new`] every `interval`, yielding the points each
    /// tick stored, including any that fill an earlier gap. Ends once
    /// `cancel` fires.
    pub fn poll(
        &self,
        interval: Duration,
        cancel: CancelToken,
    ) -> impl Stream<Item = Result<Vec<PricePoint>, SdkError>> + 'a {
        let history = PriceHistoryClient {
            client: self.client,
        };
        async_stream::stream! {
            while !cancel.is_cancelled() {
                match history.fetch_new(&cancel).await {
                    Ok(report) if !report.added.is_empty() => yield Ok(report.added),
                    Ok(_) => {}
                    Err(SdkError::Cancelled) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Price history poll failed");
                        yield Err(e);
                    }
                }
                futures_timer::Delay::new(interval).await;
            }
        }
    }

    /// Snapshot of the history, ascending by block.
    pub async fn points(&self) -> Vec<PricePoint> {
        self.client.price_history.read().await.to_vec()
    }

    pub async fn latest(&self) -> Option<PricePoint> {
        self.client.price_history.read().await.latest().cloned()
    }

    pub async fn latest_up_price_usd(&self) -> Option<f64> {
        self.client.price_history.read().await.latest_up_price_usd()
    }

    pub async fn len(&self) -> usize {
        self.client.price_history.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.client.price_history.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.client.price_history.write().await.clear();
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// Caller must hold `refresh_lock`.
    async fn fetch_locked(
        &self,
        from_block: Option<u64>,
        to_block: Option<u64>,
        cancel: &CancelToken,
    ) -> Result<RefreshReport, SdkError> {
        let Reconstruction {
            range,
            swaps,
            points,
            skipped,
            complete_through,
        } = self
            .client
            .reconstructor()
            .run(from_block, to_block, cancel)
            .await?;

        let mut state = self.client.price_history.write().await;
        let added = state.merge_new(points);
        let contiguous = state
            .scanned_to()
            .map_or(true, |prev| range.from_block <= prev.saturating_add(1));
        if contiguous && complete_through >= range.from_block {
            state.mark_scanned(complete_through);
        }

        Ok(RefreshReport {
            range,
            swaps_seen: swaps.len(),
            points_added: added.len(),
            added,
            skipped,
        })
    }
}

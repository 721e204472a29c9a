//! Price history state container — app-owned, SDK-provided update logic.

use super::PricePoint;
use std::collections::BTreeMap;

/// Ordered, deduplicated price history for one market.
///
/// Points are keyed by `block_number`: merging is set-like, the first point
/// stored for a block is kept, and iteration is always ascending.
#[derive(Debug, Clone, Default)]
pub struct PriceHistoryState {
    points: BTreeMap<u64, PricePoint>,
    /// Highest block whose swaps have been fully scanned.
    scanned_to: Option<u64>,
}

impl PriceHistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one point. Returns `false` if its block was already present.
    pub fn insert(&mut self, point: PricePoint) -> bool {
        match self.points.entry(point.block_number) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(point);
                true
            }
        }
    }

    /// Merge a batch of points, returning how many were new.
    pub fn merge(&mut self, points: impl IntoIterator<Item = PricePoint>) -> usize {
        self.merge_new(points).len()
    }

    /// Merge a batch of points, returning the ones actually stored, ascending.
    ///
    /// A new point may land below the current latest block when an earlier
    /// gap is backfilled.
    pub fn merge_new(&mut self, points: impl IntoIterator<Item = PricePoint>) -> Vec<PricePoint> {
        let mut added: Vec<PricePoint> = points
            .into_iter()
            .filter(|point| self.insert(point.clone()))
            .collect();
        added.sort_by_key(|p| p.block_number);
        added
    }

    /// Record that swaps up to and including `block` have been scanned.
    pub fn mark_scanned(&mut self, block: u64) {
        self.scanned_to = Some(self.scanned_to.map_or(block, |prev| prev.max(block)));
    }

    pub fn scanned_to(&self) -> Option<u64> {
        self.scanned_to
    }

    /// Points in ascending block order.
    pub fn points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.values()
    }

    pub fn to_vec(&self) -> Vec<PricePoint> {
        self.points.values().cloned().collect()
    }

    pub fn get(&self, block_number: u64) -> Option<&PricePoint> {
        self.points.get(&block_number)
    }

    /// Points with `block_number > after`, ascending.
    pub fn since(&self, after: u64) -> Vec<PricePoint> {
        self.points
            .range(after.saturating_add(1)..)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.values().next_back()
    }

    pub fn latest_up_price_usd(&self) -> Option<f64> {
        self.latest().map(|p| p.up_price_usd)
    }

    pub fn last_block(&self) -> Option<u64> {
        self.points.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.scanned_to = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(block: u64, price: f64) -> PricePoint {
        PricePoint {
            up_price_usd: price,
            timestamp: block * 12,
            formatted_date: String::new(),
            block_number: block,
            swap_block_number: block - 1,
        }
    }

    #[test]
    fn test_merge_dedupes_by_block() {
        let mut state = PriceHistoryState::new();
        assert_eq!(state.merge(vec![point(101, 0.6), point(141, 0.5)]), 2);
        assert_eq!(state.merge(vec![point(141, 0.9), point(206, 0.4)]), 1);
        assert_eq!(state.len(), 3);
        // first write wins
        assert_eq!(state.get(141).unwrap().up_price_usd, 0.5);
    }

    #[test]
    fn test_points_are_ascending_regardless_of_insert_order() {
        let mut state = PriceHistoryState::new();
        state.merge(vec![point(206, 0.4), point(101, 0.6)]);
        state.insert(point(141, 0.5));
        let blocks: Vec<_> = state.points().map(|p| p.block_number).collect();
        assert_eq!(blocks, [101, 141, 206]);
        assert_eq!(state.last_block(), Some(206));
        assert_eq!(state.latest_up_price_usd(), Some(0.4));
    }

    #[test]
    fn test_since_excludes_boundary() {
        let mut state = PriceHistoryState::new();
        state.merge(vec![point(101, 0.6), point(141, 0.5), point(206, 0.4)]);
        let newer: Vec<_> = state.since(141).into_iter().map(|p| p.block_number).collect();
        assert_eq!(newer, [206]);
    }

    #[test]
    fn test_merge_new_reports_backfilled_points() {
        let mut state = PriceHistoryState::new();
        state.merge(vec![point(101, 0.6), point(291, 0.4)]);

        let added = state.merge_new(vec![point(291, 0.9), point(251, 0.5)]);
        let blocks: Vec<_> = added.iter().map(|p| p.block_number).collect();
        assert_eq!(blocks, [251]);
        // below the latest block, so a `since(last_block)` view misses it
        assert!(state.since(291).is_empty());
    }

    #[test]
    fn test_mark_scanned_never_moves_backwards() {
        let mut state = PriceHistoryState::new();
        state.mark_scanned(300);
        state.mark_scanned(200);
        assert_eq!(state.scanned_to(), Some(300));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = PriceHistoryState::new();
        state.insert(point(101, 0.6));
        state.mark_scanned(150);
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.latest(), None);
        assert_eq!(state.scanned_to(), None);
    }
}

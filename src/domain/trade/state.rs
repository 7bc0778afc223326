//! Trade ledger — the session-owned, always-sorted trade collection.

use tracing::debug;

use crate::domain::trade::Trade;

/// The trade set of one feed session.
///
/// Order is always `(time, block_number, log_index)` ascending. Inserts do
/// a full re-sort rather than an incremental merge; sessions see units to
/// low hundreds of trades. Duplicate chain positions are refused, so a
/// trade that was both backfilled and delivered by a fresh subscription
/// lands once.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one live trade, keeping the ledger sorted.
    ///
    /// Returns `false` (without modifying the ledger) if a trade with the
    /// same chain position is already present.
    pub fn insert(&mut self, trade: Trade) -> bool {
        if self.contains_position(trade.block_number, trade.log_index) {
            debug!(
                block = trade.block_number,
                log = trade.log_index,
                "ignoring duplicate trade"
            );
            return false;
        }

        self.trades.push(trade);
        self.trades.sort_by_key(Trade::ordering_key);
        true
    }

    /// Merge a backfill batch, sorting and dropping duplicate positions.
    pub fn merge(&mut self, trades: Vec<Trade>) {
        self.trades.extend(trades);
        self.trades.sort_by_key(Trade::ordering_key);
        self.trades
            .dedup_by_key(|t| (t.block_number, t.log_index));
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.trades.last()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    fn contains_position(&self, block_number: u64, log_index: u64) -> bool {
        self.trades
            .iter()
            .any(|t| t.block_number == block_number && t.log_index == log_index)
    }
}

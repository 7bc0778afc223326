//! Trade-to-candle aggregation.

use rust_decimal::Decimal;

use crate::domain::candle::Candle;
use crate::domain::trade::Trade;
use crate::shared::Resolution;

/// Bucket a trade list into OHLC candles of the given width.
///
/// Input order does not matter: trades are stable-sorted by time first, so
/// trades sharing a timestamp keep their relative input order — with ledger
/// input that is the documented `(time, block, log index)` order, which
/// makes `open` and `close` deterministic. Since the sorted list is walked
/// once, grouping is a linear pass over consecutive same-bucket runs.
pub fn aggregate(trades: &[Trade], resolution: Resolution) -> Vec<Candle> {
    let width = resolution.seconds();

    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.time);

    let mut candles = Vec::new();
    let mut current_start: Option<u64> = None;
    let mut prices: Vec<Decimal> = Vec::new();

    for trade in sorted {
        let bucket = trade.time - trade.time % width;
        match current_start {
            Some(start) if start == bucket => prices.push(trade.unit_price),
            Some(start) => {
                candles.extend(build_candle(start, &prices));
                current_start = Some(bucket);
                prices.clear();
                prices.push(trade.unit_price);
            }
            None => {
                current_start = Some(bucket);
                prices.push(trade.unit_price);
            }
        }
    }

    if let Some(start) = current_start {
        candles.extend(build_candle(start, &prices));
    }

    candles
}

fn build_candle(bucket_start: u64, prices: &[Decimal]) -> Option<Candle> {
    let (first, rest) = prices.split_first()?;

    let mut high = *first;
    let mut low = *first;
    let mut close = *first;
    for price in rest {
        if *price > high {
            high = *price;
        }
        if *price < low {
            low = *price;
        }
        close = *price;
    }

    Some(Candle {
        bucket_start,
        open: *first,
        high,
        low,
        close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::TradeKind;
    use ethers::types::Address;

    fn trade_at(time: u64, price: i64, log_index: u64) -> Trade {
        Trade {
            time,
            kind: TradeKind::Buy,
            account: Address::zero(),
            quantity: Decimal::from(1),
            unit_price: Decimal::from(price),
            block_number: time,
            log_index,
        }
    }

    #[test]
    fn test_empty_input_empty_output() {
        assert!(aggregate(&[], Resolution::Minute15).is_empty());
    }

    #[test]
    fn test_ohlc_over_one_bucket() {
        // Prices [5, 3, 9, 1] in time order => open 5, high 9, low 1, close 1.
        let trades = vec![
            trade_at(0, 5, 0),
            trade_at(10, 3, 0),
            trade_at(20, 9, 0),
            trade_at(30, 1, 0),
        ];
        let candles = aggregate(&trades, Resolution::Minute1);
        assert_eq!(candles.len(), 1);
        let c = &candles[0];
        assert_eq!(c.bucket_start, 0);
        assert_eq!(c.open, Decimal::from(5));
        assert_eq!(c.high, Decimal::from(9));
        assert_eq!(c.low, Decimal::from(1));
        assert_eq!(c.close, Decimal::from(1));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let trades = vec![trade_at(5, 2, 0), trade_at(65, 4, 0), trade_at(700, 3, 0)];
        let first = aggregate(&trades, Resolution::Minute1);
        let second = aggregate(&trades, Resolution::Minute1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bucket_starts_strictly_ascending() {
        let trades = vec![
            trade_at(10, 1, 0),
            trade_at(950, 2, 0),
            trade_at(70, 3, 0),
            trade_at(1900, 4, 0),
            trade_at(65, 5, 1),
        ];
        let candles = aggregate(&trades, Resolution::Minute1);
        for pair in candles.windows(2) {
            assert!(pair[0].bucket_start < pair[1].bucket_start);
        }
    }

    #[test]
    fn test_bucket_containment() {
        let width = Resolution::Minute15.seconds();
        let trades = vec![
            trade_at(1_700_000_123, 1, 0),
            trade_at(1_700_000_899, 2, 0),
            trade_at(1_700_003_001, 3, 0),
        ];
        let candles = aggregate(&trades, Resolution::Minute15);
        for trade in &trades {
            let holder = candles
                .iter()
                .find(|c| c.bucket_start <= trade.time && trade.time < c.bucket_start + width);
            assert!(holder.is_some(), "trade at {} not contained", trade.time);
            assert_eq!(holder.unwrap().bucket_start, trade.time - trade.time % width);
        }
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let trades = vec![trade_at(120, 7, 0), trade_at(0, 5, 0), trade_at(60, 6, 0)];
        let candles = aggregate(&trades, Resolution::Minute1);
        let starts: Vec<u64> = candles.iter().map(|c| c.bucket_start).collect();
        assert_eq!(starts, vec![0, 60, 120]);
        assert_eq!(candles[0].open, Decimal::from(5));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order_for_open_close() {
        // Same second, ledger order by log index: [2, 8] => open 2, close 8.
        let trades = vec![trade_at(30, 2, 1), trade_at(30, 8, 2)];
        let candles = aggregate(&trades, Resolution::Minute1);
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].open, Decimal::from(2));
        assert_eq!(candles[0].close, Decimal::from(8));

        // Reversed input order flips open/close: the stable sort preserves
        // whatever order the caller's ledger established.
        let reversed = vec![trade_at(30, 8, 2), trade_at(30, 2, 1)];
        let candles = aggregate(&reversed, Resolution::Minute1);
        assert_eq!(candles[0].open, Decimal::from(8));
        assert_eq!(candles[0].close, Decimal::from(2));
    }

    #[test]
    fn test_sparse_buckets_not_filled() {
        // A quiet window produces no candle, not a flat one.
        let trades = vec![trade_at(0, 1, 0), trade_at(3600, 2, 0)];
        let candles = aggregate(&trades, Resolution::Minute15);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].bucket_start, 0);
        assert_eq!(candles[1].bucket_start, 3600);
    }
}

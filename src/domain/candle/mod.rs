//! Candle domain — OHLC aggregates over fixed time buckets.

mod aggregate;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use aggregate::aggregate;

/// Open/high/low/close summary of one time bucket.
///
/// Candles are derived, never stored: every change to the trade set
/// recomputes the whole series from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start: trade time rounded down to the bucket width.
    pub bucket_start: u64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

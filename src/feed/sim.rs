//! Simulated feed — deterministic random-walk data for demo tokens.
//!
//! Demo tokens have no chain history, so the dashboard shows a synthetic
//! 24-hour tape instead. The generator is a plain LCG seeded from the
//! token address: the same address always yields the same trades, which
//! keeps demo charts stable across reloads.

use chrono::Utc;
use ethers::types::Address;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::candle::aggregate;
use crate::domain::trade::Trade;
use crate::feed::FeedSnapshot;
use crate::shared::{Resolution, TradeKind};

/// Walk start: 0.00001268 native per token.
const START_PRICE: Decimal = Decimal::from_parts(1268, 0, 0, false, 8);
/// Walk ceiling: 0.0005.
const MAX_PRICE: Decimal = Decimal::from_parts(5, 0, 0, false, 4);
/// Walk floor, just above zero.
const LOWER_BOUND: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

const TRADES_PER_MINUTE: u64 = 2;
const MINUTES_IN_DAY: u64 = 24 * 60;
const TOTAL_TRADES: u64 = MINUTES_IN_DAY * TRADES_PER_MINUTE;

const LCG_MODULUS: u64 = 1 << 32;

/// Linear congruential generator matching the dashboard's demo data.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self {
            state: u64::from(seed.max(1)),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = (self.state.wrapping_mul(1_664_525) + 1_013_904_223) % LCG_MODULUS;
        self.state as u32
    }

    /// Uniform value in [0, 1).
    fn next_unit(&mut self) -> Decimal {
        Decimal::from(self.next_u32()) / Decimal::from(LCG_MODULUS)
    }
}

/// Seed from the low four bytes of the token address.
fn seed_from_address(address: Address) -> u32 {
    let bytes = address.as_bytes();
    u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]])
}

/// Generate the 24-hour simulated tape ending at `end_time`.
pub fn simulated_trades(address: Address, end_time: u64) -> Vec<Trade> {
    let start_time = end_time.saturating_sub(24 * 3600);
    let total_seconds = end_time - start_time;
    let avg_spacing = Decimal::from(total_seconds) / Decimal::from(TOTAL_TRADES);

    let mut rng = Lcg::new(seed_from_address(address));
    let mut price = START_PRICE;
    let mut time = start_time;
    let mut trades = Vec::with_capacity(TOTAL_TRADES as usize);

    let two_percent = Decimal::new(2, 2);

    for i in 0..TOTAL_TRADES {
        // ±2% step around the last price, clamped to the walk band.
        let change = (rng.next_unit() * Decimal::from(2) - Decimal::ONE) * two_percent;
        price = (price * (Decimal::ONE + change)).clamp(LOWER_BOUND, MAX_PRICE);

        let kind = if rng.next_unit() < Decimal::new(5, 1) {
            TradeKind::Buy
        } else {
            TradeKind::Sell
        };

        let account = synthetic_account(&mut rng);
        let quantity = Decimal::from(1000) + (rng.next_unit() * Decimal::from(9000)).trunc();

        trades.push(Trade {
            time,
            kind,
            account,
            quantity,
            unit_price: price,
            block_number: i,
            log_index: 0,
        });

        // ~30s apart, jittered to 0.8–1.2x of the even spacing.
        let jitter = Decimal::new(8, 1) + Decimal::new(4, 1) * rng.next_unit();
        let step = (avg_spacing * jitter).trunc().to_u64().unwrap_or(1).max(1);
        time += step;
    }

    trades
}

/// A full snapshot for a demo token: the simulated tape aggregated at
/// one-minute candles, already loaded, never erroring.
pub fn simulated_snapshot(address: Address) -> FeedSnapshot {
    let now = Utc::now().timestamp().max(0) as u64;
    let trades = simulated_trades(address, now);
    let candles = aggregate(&trades, Resolution::Minute1);
    FeedSnapshot {
        trades,
        candles,
        loading: false,
        error: None,
        pool_address: None,
    }
}

fn synthetic_account(rng: &mut Lcg) -> Address {
    let mut bytes = [0u8; 20];
    for chunk in bytes.chunks_mut(4) {
        chunk.copy_from_slice(&rng.next_u32().to_be_bytes()[..chunk.len()]);
    }
    Address::from(bytes)
}

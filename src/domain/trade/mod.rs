//! Trade domain — normalized on-chain trade records.

mod convert;
pub mod state;
pub mod wire;

use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::TradeKind;

pub use convert::{trade_from_curve_event, trade_from_swap};
pub use state::TradeLedger;
pub use wire::EventMeta;

/// A single executed exchange of the agent token, normalized from either a
/// bonding-curve event or a pool swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unix timestamp (seconds) of the containing block.
    pub time: u64,
    pub kind: TradeKind,
    /// Buyer, seller, or swap recipient.
    pub account: Address,
    /// Amount of the agent token moved, in whole-token units.
    pub quantity: Decimal,
    /// Price per token in the chain's native currency.
    pub unit_price: Decimal,
    /// Containing block — ordering metadata.
    pub block_number: u64,
    /// Position within the block — ordering metadata.
    pub log_index: u64,
}

impl Trade {
    /// The ledger's documented total order: block timestamps first, then
    /// the chain's own intra-block event order. Trades sharing a timestamp
    /// are deterministic, which fixes which price a candle opens and
    /// closes on.
    pub fn ordering_key(&self) -> (u64, u64, u64) {
        (self.time, self.block_number, self.log_index)
    }
}

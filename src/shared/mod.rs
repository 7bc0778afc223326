//! Shared types and utilities used across all domain modules.

pub mod fmt;
pub mod scaling;

pub use fmt::format_price;
pub use scaling::{scale_raw_amount, wei_to_eth, ScalingError};

use ethers::types::Address;
use serde::{Deserialize, Serialize};

// ─── TradeKind ───────────────────────────────────────────────────────────────

/// Direction of an executed trade: the counterparty bought or sold the
/// agent token.
///
/// There is deliberately no `Swap` variant — a pool swap that cannot be
/// classified as a buy or a sell never becomes a trade at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "Buy"),
            TradeKind::Sell => write!(f, "Sell"),
        }
    }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Candle bucket width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[default]
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
        }
    }

    /// Duration of one candle bucket in seconds.
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Hour1 => 3600,
            Self::Hour4 => 21600,
            Self::Day1 => 86400,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Utilities ───────────────────────────────────────────────────────────────

/// Sort two token addresses ascending, matching the pool contracts'
/// internal `token0 < token1` requirement.
///
/// The returned order decides which side of a pool the agent token sits on,
/// so every pool lookup must go through this before touching the factory.
pub fn sort_token_addresses(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

//! # curvefeed
//!
//! Market-data SDK for bonding-curve agent tokens on EVM chains.
//!
//! Agent tokens trade on a bonding-curve contract until the curve
//! finalizes into a Uniswap V3 pool. This crate merges both event sources
//! into one time-ordered trade ledger and derives OHLC candles from it,
//! exposing a reactive `{trades, candles, loading, error, pool_address}`
//! view for charting.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — shared newtypes, domain models, scaling math, errors
//! 2. **Chain access** — contract bindings, batched log reads, block
//!    timestamps, pool resolution, RPC retry policy
//! 3. **Feed** — the per-session orchestrator task (backfill + live
//!    subscriptions + snapshot publication) and the simulated feed
//! 4. **Price** — Chainlink ETH/USD behind an explicit TTL cache
//! 5. **High-Level Client** — `AgentMarketClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use curvefeed::prelude::*;
//!
//! let client = AgentMarketClient::builder()
//!     .ws_url("wss://mainnet.base.org")
//!     .connect()
//!     .await?;
//!
//! let feed = client.feed(FeedParams::new(curve_address, agent_address, deploy_block));
//! let mut updates = feed.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow().clone();
//!     render(snapshot.candles);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and utilities used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire decoding, conversions,
/// state containers.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Chain constants.
pub mod network;

// ── Layer 2: Chain access ────────────────────────────────────────────────────

/// Contract bindings, batched log reads, block timestamps, pool
/// resolution, retry policy.
pub mod chain;

// ── Layer 3: Feed ────────────────────────────────────────────────────────────

/// The data feed: backfill, live subscriptions, reactive snapshots.
pub mod feed;

// ── Layer 4: Price ───────────────────────────────────────────────────────────

/// ETH/USD pricing behind a TTL cache.
pub mod price;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `AgentMarketClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared types
    pub use crate::shared::{format_price, Resolution, TradeKind};

    // Domain types
    pub use crate::domain::candle::{aggregate, Candle};
    pub use crate::domain::trade::{Trade, TradeLedger};

    // Errors
    pub use crate::error::FeedError;

    // Chain access
    pub use crate::chain::{split_block_ranges, LogReader, RetryConfig, WsProvider};

    // Feed
    pub use crate::feed::sim::{simulated_snapshot, simulated_trades};
    pub use crate::feed::{DataFeed, FeedParams, FeedSnapshot};

    // Price
    pub use crate::price::UsdPriceCache;

    // Client + sub-clients
    pub use crate::client::{AgentMarketClient, AgentMarketClientBuilder, CurveReader, Pools};
}

//! The data feed: historical backfill, live subscriptions, and the
//! reactive snapshot the UI consumes.

pub mod orchestrator;
pub mod sim;

use std::sync::Arc;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::chain::logs::WsProvider;
use crate::chain::retry::RetryConfig;
use crate::domain::candle::Candle;
use crate::domain::trade::Trade;
use crate::shared::Resolution;

pub use orchestrator::DataFeed;

/// Everything a feed session needs from the surrounding client: the shared
/// provider plus the chain-level configuration.
#[derive(Debug, Clone)]
pub struct FeedContext {
    pub provider: Arc<WsProvider>,
    pub factory: Address,
    pub counter_asset: Address,
    pub pool_fee: u32,
    pub log_span: u64,
    pub retry: RetryConfig,
}

/// Per-session parameters: which token to watch and from where.
#[derive(Debug, Clone)]
pub struct FeedParams {
    /// Bonding-curve contract of the agent token.
    pub curve_address: Address,
    /// The agent token itself (used for pool resolution).
    pub agent_address: Address,
    /// Block the pair was deployed at — backfill starts here.
    pub deploy_block: u64,
    /// Candle bucket width for the published series.
    pub resolution: Resolution,
    /// Agent token decimals, for scaling swap deltas.
    pub token_decimals: u8,
}

impl FeedParams {
    pub fn new(curve_address: Address, agent_address: Address, deploy_block: u64) -> Self {
        Self {
            curve_address,
            agent_address,
            deploy_block,
            resolution: Resolution::default(),
            token_decimals: 18,
        }
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn token_decimals(mut self, decimals: u8) -> Self {
        self.token_decimals = decimals;
        self
    }
}

/// The reactive view a feed session publishes on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub trades: Vec<Trade>,
    pub candles: Vec<Candle>,
    pub loading: bool,
    pub error: Option<String>,
    pub pool_address: Option<Address>,
}

impl FeedSnapshot {
    /// The snapshot consumers see while a backfill is in flight.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_snapshot_shape() {
        let snap = FeedSnapshot::loading();
        assert!(snap.loading);
        assert!(snap.trades.is_empty());
        assert!(snap.candles.is_empty());
        assert_eq!(snap.error, None);
        assert_eq!(snap.pool_address, None);
    }

    #[test]
    fn test_params_defaults() {
        let params = FeedParams::new(Address::zero(), Address::zero(), 10);
        assert_eq!(params.resolution, Resolution::Minute15);
        assert_eq!(params.token_decimals, 18);

        let params = params.resolution(Resolution::Minute1).token_decimals(6);
        assert_eq!(params.resolution, Resolution::Minute1);
        assert_eq!(params.token_decimals, 6);
    }

    #[test]
    fn test_snapshot_serializes_for_ui() {
        let snap = FeedSnapshot::loading();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["loading"], true);
        assert!(json["trades"].as_array().unwrap().is_empty());
        assert!(json["error"].is_null());
    }
}

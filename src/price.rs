//! ETH/USD pricing via Chainlink, behind an explicit TTL cache.
//!
//! The USD price decorates charts and market caps; it does not need to be
//! fresh per request. The cache is an owned object injected through the
//! client — there is no module-level state — and a one-hour TTL keeps RPC
//! traffic negligible.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ethers::types::Address;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::chain::abi::ChainlinkAggregator;
use crate::chain::logs::WsProvider;
use crate::error::FeedError;
use crate::shared::ScalingError;

/// Chainlink price feeds answer with eight decimals.
const FEED_DECIMALS: u32 = 8;

/// A single cached value with an expiry window.
#[derive(Debug, Default)]
struct TtlCell<T> {
    slot: Option<(T, Instant)>,
}

impl<T: Clone> TtlCell<T> {
    fn get(&self, ttl: Duration) -> Option<T> {
        self.slot
            .as_ref()
            .filter(|(_, at)| at.elapsed() < ttl)
            .map(|(value, _)| value.clone())
    }

    fn set(&mut self, value: T) {
        self.slot = Some((value, Instant::now()));
    }
}

/// Cached Chainlink ETH/USD reader.
pub struct UsdPriceCache {
    provider: Arc<WsProvider>,
    feed_address: Address,
    ttl: Duration,
    cell: RwLock<TtlCell<Decimal>>,
}

impl UsdPriceCache {
    pub fn new(provider: Arc<WsProvider>, feed_address: Address, ttl: Duration) -> Self {
        Self {
            provider,
            feed_address,
            ttl,
            cell: RwLock::new(TtlCell::default()),
        }
    }

    /// Current ETH price in USD, at most `ttl` old.
    pub async fn eth_usd(&self) -> Result<Decimal, FeedError> {
        if let Some(price) = self.cell.read().await.get(self.ttl) {
            return Ok(price);
        }

        let feed = ChainlinkAggregator::new(self.feed_address, self.provider.clone());
        let (_, answer, _, _, _) = feed.latest_round_data().call().await?;

        let raw = i128::try_from(answer).map_err(|_| {
            FeedError::Scaling(ScalingError::Overflow {
                context: format!("price feed answer {} does not fit in i128", answer),
            })
        })?;
        let price = Decimal::try_from_i128_with_scale(raw, FEED_DECIMALS).map_err(|_| {
            FeedError::Scaling(ScalingError::Overflow {
                context: format!("price feed answer {} exceeds decimal precision", answer),
            })
        })?;

        debug!(%price, "refreshed ETH/USD price");
        self.cell.write().await.set(price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_cell_fresh_value_returned() {
        let mut cell = TtlCell::default();
        cell.set(Decimal::from(3000));
        assert_eq!(cell.get(Duration::from_secs(3600)), Some(Decimal::from(3000)));
    }

    #[test]
    fn test_ttl_cell_expired_value_dropped() {
        let mut cell = TtlCell::default();
        cell.set(Decimal::from(3000));
        assert_eq!(cell.get(Duration::ZERO), None);
    }

    #[test]
    fn test_ttl_cell_empty() {
        let cell: TtlCell<Decimal> = TtlCell::default();
        assert_eq!(cell.get(Duration::from_secs(1)), None);
    }
}

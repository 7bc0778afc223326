//! High-level client — `AgentMarketClient` with nested sub-client
//! accessors.
//!
//! The client owns the shared WebSocket provider and the chain
//! configuration; feed sessions, curve reads, pool lookups, and the USD
//! price cache all hang off it.

use std::sync::Arc;
use std::time::Duration;

use ethers::providers::{Provider, Ws};
use ethers::types::{Address, U256};
use rust_decimal::Decimal;

use crate::chain::abi::BondingCurve;
use crate::chain::logs::{retrying, WsProvider};
use crate::chain::pool::resolve_pool;
use crate::chain::retry::RetryConfig;
use crate::error::FeedError;
use crate::feed::{DataFeed, FeedContext, FeedParams};
use crate::network;
use crate::price::UsdPriceCache;
use crate::shared::wei_to_eth;

/// The primary entry point for the SDK.
///
/// Cheap to clone; clones share the provider and the price cache.
pub struct AgentMarketClient {
    provider: Arc<WsProvider>,
    factory: Address,
    counter_asset: Address,
    pool_fee: u32,
    log_span: u64,
    retry: RetryConfig,
    usd_price: Arc<UsdPriceCache>,
}

impl AgentMarketClient {
    pub fn builder() -> AgentMarketClientBuilder {
        AgentMarketClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    /// Read surface of one bonding curve.
    pub fn curve(&self, address: Address) -> CurveReader<'_> {
        CurveReader {
            client: self,
            address,
        }
    }

    /// Pool lookups.
    pub fn pools(&self) -> Pools<'_> {
        Pools { client: self }
    }

    /// Cached ETH/USD price.
    pub fn price(&self) -> &UsdPriceCache {
        &self.usd_price
    }

    /// Spawn a live data feed for one curve/token pair.
    ///
    /// Feed lifetimes are managed by the caller (typically tied to a chart
    /// view); the client hands out independent sessions rather than
    /// embedding one.
    pub fn feed(&self, params: FeedParams) -> DataFeed {
        DataFeed::spawn(
            FeedContext {
                provider: self.provider.clone(),
                factory: self.factory,
                counter_asset: self.counter_asset,
                pool_fee: self.pool_fee,
                log_span: self.log_span,
                retry: self.retry.clone(),
            },
            params,
        )
    }

    pub fn provider(&self) -> Arc<WsProvider> {
        self.provider.clone()
    }
}

impl Clone for AgentMarketClient {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            factory: self.factory,
            counter_asset: self.counter_asset,
            pool_fee: self.pool_fee,
            log_span: self.log_span,
            retry: self.retry.clone(),
            usd_price: self.usd_price.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Sub-clients
// ═════════════════════════════════════════════════════════════════════════════

/// Sub-client for bonding-curve reads.
pub struct CurveReader<'a> {
    client: &'a AgentMarketClient,
    address: Address,
}

impl<'a> CurveReader<'a> {
    fn contract(&self) -> BondingCurve<WsProvider> {
        BondingCurve::new(self.address, self.client.provider.clone())
    }

    /// Whether the curve has migrated its liquidity to the open market.
    pub async fn finalized(&self) -> Result<bool, FeedError> {
        let curve = self.contract();
        retrying(&self.client.retry, "finalized", || {
            let call = curve.finalized();
            async move { call.call().await }
        })
        .await
    }

    /// Whole tokens sold by the curve so far.
    pub async fn circulating_supply(&self) -> Result<U256, FeedError> {
        let curve = self.contract();
        retrying(&self.client.retry, "circulatingSupply", || {
            let call = curve.circulating_supply();
            async move { call.call().await }
        })
        .await
    }

    /// Cost in native currency to buy `amount` whole tokens at `supply`.
    pub async fn buy_cost(&self, supply: U256, amount: U256) -> Result<Decimal, FeedError> {
        let curve = self.contract();
        let (cost, _fee) = retrying(&self.client.retry, "getBuyPrice", || {
            let call = curve.get_buy_price(supply, amount);
            async move { call.call().await }
        })
        .await?;
        Ok(wei_to_eth(cost)?)
    }

    /// Price of one token at the current supply, in native currency.
    pub async fn spot_price(&self) -> Result<Decimal, FeedError> {
        let supply = self.circulating_supply().await?;
        self.buy_cost(supply, U256::one()).await
    }

    /// Market cap in USD over the fixed total supply.
    ///
    /// A curve that has sold nothing yet has no market — the cap is zero,
    /// not the hypothetical first-token price times a billion.
    pub async fn market_cap_usd(&self) -> Result<Decimal, FeedError> {
        let supply = self.circulating_supply().await?;
        if supply.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let spot = self.buy_cost(supply, U256::one()).await?;
        let eth_usd = self.client.usd_price.eth_usd().await?;
        Ok(spot * eth_usd * Decimal::from(network::TOTAL_SUPPLY))
    }
}

/// Sub-client for pool lookups.
pub struct Pools<'a> {
    client: &'a AgentMarketClient,
}

impl<'a> Pools<'a> {
    /// The canonical pool for an agent token against the configured
    /// counter-asset, or `None` if it has not been created yet.
    pub async fn resolve(&self, agent_token: Address) -> Result<Option<Address>, FeedError> {
        let client = self.client;
        retrying(&client.retry, "getPool", || {
            resolve_pool(
                client.provider.clone(),
                client.factory,
                agent_token,
                client.counter_asset,
                client.pool_fee,
            )
        })
        .await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct AgentMarketClientBuilder {
    ws_url: String,
    factory: Address,
    counter_asset: Address,
    pool_fee: u32,
    chainlink_feed: Address,
    price_ttl: Duration,
    log_span: u64,
    retry: RetryConfig,
}

impl Default for AgentMarketClientBuilder {
    fn default() -> Self {
        Self {
            ws_url: network::DEFAULT_WS_RPC_URL.to_string(),
            factory: network::uniswap_v3_factory(),
            counter_asset: network::weth_address(),
            pool_fee: network::POOL_FEE,
            chainlink_feed: network::chainlink_eth_usd_feed(),
            price_ttl: Duration::from_secs(3600),
            log_span: network::LOG_QUERY_SPAN,
            retry: RetryConfig::default(),
        }
    }
}

impl AgentMarketClientBuilder {
    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn factory(mut self, address: Address) -> Self {
        self.factory = address;
        self
    }

    pub fn counter_asset(mut self, address: Address) -> Self {
        self.counter_asset = address;
        self
    }

    pub fn pool_fee(mut self, fee: u32) -> Self {
        self.pool_fee = fee;
        self
    }

    pub fn chainlink_feed(mut self, address: Address) -> Self {
        self.chainlink_feed = address;
        self
    }

    pub fn price_ttl(mut self, ttl: Duration) -> Self {
        self.price_ttl = ttl;
        self
    }

    pub fn log_span(mut self, span: u64) -> Self {
        self.log_span = span;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Connect the shared WebSocket provider and build the client.
    pub async fn connect(self) -> Result<AgentMarketClient, FeedError> {
        let provider = Arc::new(Provider::<Ws>::connect(&self.ws_url).await?);
        let usd_price = Arc::new(UsdPriceCache::new(
            provider.clone(),
            self.chainlink_feed,
            self.price_ttl,
        ));

        Ok(AgentMarketClient {
            provider,
            factory: self.factory,
            counter_asset: self.counter_asset,
            pool_fee: self.pool_fee,
            log_span: self.log_span,
            retry: self.retry,
            usd_price,
        })
    }
}

//! Integration tests against a live Base RPC endpoint.
//!
//! These exercise the chain layer end to end: pool resolution, batched log
//! reads, block-timestamp caching, and the USD price feed.
//!
//! All tests are `#[ignore]` because they require network access.
//!
//! Run with:
//! ```bash
//! cargo test --test feed_live -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use ethers::contract::EthEvent;
use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::{Address, Filter};
use rust_decimal::Decimal;

use curvefeed::chain::abi::uniswap_v3_pool::SwapFilter;
use curvefeed::chain::{BlockTimestamps, LogReader, RetryConfig};
use curvefeed::network;
use curvefeed::price::UsdPriceCache;

const WS_URL: &str = "wss://mainnet.base.org";

/// Base mainnet USDC — paired with WETH in a long-lived 0.05% pool.
const USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

async fn provider() -> Arc<Provider<Ws>> {
    Arc::new(
        Provider::<Ws>::connect(WS_URL)
            .await
            .expect("connect should succeed"),
    )
}

#[tokio::test]
#[ignore]
async fn resolves_known_pool() {
    let provider = provider().await;
    let usdc: Address = USDC.parse().unwrap();

    let pool = curvefeed::chain::resolve_pool(
        provider,
        network::uniswap_v3_factory(),
        usdc,
        network::weth_address(),
        500,
    )
    .await
    .expect("factory call should succeed");

    assert!(pool.is_some(), "WETH/USDC 0.05% pool should exist on Base");
}

#[tokio::test]
#[ignore]
async fn unknown_pair_resolves_to_none() {
    let provider = provider().await;
    // A throwaway address no factory has ever seen.
    let bogus: Address = "0x00000000000000000000000000000000000fffff".parse().unwrap();

    let pool = curvefeed::chain::resolve_pool(
        provider,
        network::uniswap_v3_factory(),
        bogus,
        network::weth_address(),
        500,
    )
    .await
    .expect("factory call should succeed");

    assert_eq!(pool, None);
}

#[tokio::test]
#[ignore]
async fn batched_reads_match_single_call() {
    let provider = provider().await;
    let latest = provider.get_block_number().await.unwrap().as_u64();
    let from = latest - 2_000;

    let usdc: Address = USDC.parse().unwrap();
    let pool = curvefeed::chain::resolve_pool(
        provider.clone(),
        network::uniswap_v3_factory(),
        usdc,
        network::weth_address(),
        500,
    )
    .await
    .unwrap()
    .expect("pool should exist");

    let filter = Filter::new().address(pool).topic0(SwapFilter::signature());

    let single = LogReader::new(provider.clone(), 1_000_000, RetryConfig::default())
        .logs(&filter, from, latest)
        .await
        .unwrap();
    let batched = LogReader::new(provider, 500, RetryConfig::default())
        .logs(&filter, from, latest)
        .await
        .unwrap();

    assert_eq!(single.len(), batched.len());
    for (a, b) in single.iter().zip(batched.iter()) {
        assert_eq!(a.block_number, b.block_number);
        assert_eq!(a.log_index, b.log_index);
    }
}

#[tokio::test]
#[ignore]
async fn block_timestamps_cached() {
    let provider = provider().await;
    let latest = provider.get_block_number().await.unwrap().as_u64();

    let retry = RetryConfig::default();
    let mut timestamps = BlockTimestamps::new();
    let first = timestamps.get(&provider, &retry, latest).await.unwrap();
    let second = timestamps.get(&provider, &retry, latest).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(timestamps.len(), 1);
    assert!(first > 1_600_000_000, "timestamp should be a sane unix time");
}

#[tokio::test]
#[ignore]
async fn eth_usd_price_is_plausible() {
    let provider = provider().await;
    let cache = UsdPriceCache::new(
        provider,
        network::chainlink_eth_usd_feed(),
        Duration::from_secs(3600),
    );

    let price = cache.eth_usd().await.expect("price read should succeed");
    assert!(price > Decimal::from(10), "ETH above $10: {price}");
    assert!(price < Decimal::from(1_000_000), "ETH below $1M: {price}");
}

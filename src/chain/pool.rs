//! Canonical pool resolution.

use std::sync::Arc;

use ethers::types::Address;
use tracing::debug;

use crate::chain::abi::UniswapV3Factory;
use crate::chain::logs::WsProvider;
use crate::error::FeedError;
use crate::shared::sort_token_addresses;

/// Resolve the Uniswap V3 pool for `(agent token, counter asset)` at the
/// given fee tier.
///
/// Tokens are sorted ascending before the factory lookup, which also pins
/// the pool's `token0`/`token1` orientation the swap classifier relies on.
/// A zero address from the factory means no pool exists yet; that is a
/// normal state (the token may still live on its bonding curve), not an
/// error.
pub async fn resolve_pool(
    provider: Arc<WsProvider>,
    factory: Address,
    agent_token: Address,
    counter_asset: Address,
    fee: u32,
) -> Result<Option<Address>, FeedError> {
    let (token0, token1) = sort_token_addresses(agent_token, counter_asset);

    let factory = UniswapV3Factory::new(factory, provider);
    let pool = factory.get_pool(token0, token1, fee).call().await?;

    if pool == Address::zero() {
        debug!(%agent_token, "no pool for agent token");
        return Ok(None);
    }

    debug!(%agent_token, %pool, "resolved pool");
    Ok(Some(pool))
}

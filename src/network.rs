//! Chain constants for the networks the SDK targets.
//!
//! Addresses are the Base mainnet deployments; every one of them can be
//! overridden through the client builder for testnets.

use ethers::types::Address;

/// Default WebSocket JSON-RPC endpoint.
pub const DEFAULT_WS_RPC_URL: &str = "wss://mainnet.base.org";

/// Canonical Uniswap V3 factory.
pub const UNISWAP_V3_FACTORY: &str = "0x33128a8fC17869897dcE68Ed026d694621f6FDfD";

/// Wrapped native currency (WETH) — the counter-asset every agent token
/// pool is quoted against.
pub const WETH_ADDRESS: &str = "0x4200000000000000000000000000000000000006";

/// Chainlink ETH/USD aggregator.
pub const CHAINLINK_ETH_USD_FEED: &str = "0x71041dddad3595F9CEd3DcCFBe3D1F4b0a16Bb70";

/// Fee tier (hundredths of a bip) agent pools are created with.
pub const POOL_FEE: u32 = 100;

/// Agent tokens have a fixed total supply of one billion whole tokens.
pub const TOTAL_SUPPLY: u64 = 1_000_000_000;

/// Maximum block span of a single `eth_getLogs` query. Providers reject
/// wider ranges, so historical reads are chunked at this width.
pub const LOG_QUERY_SPAN: u64 = 100_000;

pub fn uniswap_v3_factory() -> Address {
    UNISWAP_V3_FACTORY.parse().expect("valid address constant")
}

pub fn weth_address() -> Address {
    WETH_ADDRESS.parse().expect("valid address constant")
}

pub fn chainlink_eth_usd_feed() -> Address {
    CHAINLINK_ETH_USD_FEED.parse().expect("valid address constant")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_constants_parse() {
        assert_ne!(uniswap_v3_factory(), Address::zero());
        assert_ne!(weth_address(), Address::zero());
        assert_ne!(chainlink_eth_usd_feed(), Address::zero());
    }
}

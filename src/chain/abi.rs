//! Typed contract bindings.
//!
//! Every contract surface the SDK touches is declared here once, with the
//! minimal ABI it actually uses. `abigen!` also generates the per-contract
//! event enums (`BondingCurveEvents`, `UniswapV3PoolEvents`) the decode
//! layer relies on: a log either decodes into a known tagged variant or is
//! rejected whole.

use ethers::prelude::abigen;

abigen!(
    BondingCurve,
    r#"[
        function finalized() external view returns (bool)
        function circulatingSupply() external view returns (uint256)
        function getBuyPrice(uint256 supply, uint256 amount) external view returns (uint256 cost, uint256 fee)
        event Buy(address indexed account, uint256 amount, uint256 cost)
        event Sell(address indexed account, uint256 amount, uint256 refund)
    ]"#
);

abigen!(
    UniswapV3Pool,
    r#"[
        function token0() external view returns (address)
        function token1() external view returns (address)
        event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)
    ]"#
);

abigen!(
    UniswapV3Factory,
    r#"[
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool)
    ]"#
);

abigen!(
    ChainlinkAggregator,
    r#"[
        function latestRoundData() external view returns (uint80 roundId, int256 answer, uint256 startedAt, uint256 updatedAt, uint80 answeredInRound)
    ]"#
);

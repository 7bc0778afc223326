//! Chain access: contract bindings, batched log reads, block timestamps,
//! pool resolution, and the RPC retry policy.

pub mod abi;
pub mod logs;
pub mod pool;
pub mod retry;

pub use logs::{split_block_ranges, BlockTimestamps, LogReader, WsProvider};
pub use pool::resolve_pool;
pub use retry::RetryConfig;

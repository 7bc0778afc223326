//! Historical log reads and block-timestamp resolution.
//!
//! Providers cap the block span of a single `eth_getLogs` call, so wide
//! ranges are split into fixed-width sub-ranges queried sequentially and
//! concatenated in ascending order. Trades need the timestamp of their
//! containing block (one extra round-trip per block), so lookups go through
//! a per-session cache — events sharing a block resolve it once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::{Filter, Log};
use tracing::{debug, warn};

use crate::chain::retry::RetryConfig;
use crate::error::FeedError;

/// The provider type the SDK runs on. A single WebSocket connection serves
/// calls, log queries, and pubsub subscriptions.
pub type WsProvider = Provider<Ws>;

/// Partition an inclusive block range into consecutive sub-ranges of at
/// most `span` blocks, ascending.
pub fn split_block_ranges(from: u64, to: u64, span: u64) -> Vec<(u64, u64)> {
    let span = span.max(1);
    let mut ranges = Vec::new();
    let mut current = from;
    while current <= to {
        let end = current.saturating_add(span - 1).min(to);
        ranges.push((current, end));
        if end == u64::MAX {
            break;
        }
        current = end + 1;
    }
    ranges
}

/// Batched historical log reader.
#[derive(Debug, Clone)]
pub struct LogReader {
    provider: Arc<WsProvider>,
    span: u64,
    retry: RetryConfig,
}

impl LogReader {
    pub fn new(provider: Arc<WsProvider>, span: u64, retry: RetryConfig) -> Self {
        Self {
            provider,
            span,
            retry,
        }
    }

    /// Fetch all logs matching `filter` over `[from, to]`.
    ///
    /// Sub-ranges are queried sequentially; results arrive in ascending
    /// block order, so plain concatenation preserves chain order. A failed
    /// sub-range (after retries) fails the whole read — the caller decides
    /// whether that degrades the source to empty or surfaces an error.
    pub async fn logs(&self, filter: &Filter, from: u64, to: u64) -> Result<Vec<Log>, FeedError> {
        let ranges = split_block_ranges(from, to, self.span);
        debug!(
            from,
            to,
            batches = ranges.len(),
            "fetching historical logs"
        );

        let mut all = Vec::new();
        for (lo, hi) in ranges {
            let ranged = filter.clone().from_block(lo).to_block(hi);
            let logs = retrying(&self.retry, "eth_getLogs", || {
                self.provider.get_logs(&ranged)
            })
            .await?;
            all.extend(logs);
        }
        Ok(all)
    }
}

/// Per-session cache of `block number → unix timestamp (seconds)`.
#[derive(Debug, Default)]
pub struct BlockTimestamps {
    cache: HashMap<u64, u64>,
}

impl BlockTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a block's timestamp, fetching it at most once.
    pub async fn get(
        &mut self,
        provider: &WsProvider,
        retry: &RetryConfig,
        number: u64,
    ) -> Result<u64, FeedError> {
        if let Some(ts) = self.cache.get(&number) {
            return Ok(*ts);
        }

        let block = retrying(retry, "eth_getBlockByNumber", || provider.get_block(number))
            .await?
            .ok_or(FeedError::MissingBlock(number))?;

        let ts = block.timestamp.as_u64();
        self.cache.insert(number, ts);
        Ok(ts)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Run an idempotent read under the given retry policy.
///
/// Only for operations that are safe to repeat: log queries, block
/// lookups, view calls.
pub(crate) async fn retrying<T, E, F, Fut>(
    retry: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, FeedError>
where
    E: std::fmt::Display,
    FeedError: From<E>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= retry.max_retries => {
                return if attempt == 0 {
                    Err(FeedError::from(e))
                } else {
                    Err(FeedError::RetriesExhausted {
                        attempts: attempt + 1,
                        last_error: e.to_string(),
                    })
                };
            }
            Err(e) => {
                let delay = retry.delay_for_attempt(attempt);
                warn!(
                    %e,
                    attempt = attempt + 1,
                    max = retry.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "{what} failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

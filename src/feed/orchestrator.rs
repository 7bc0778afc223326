//! Feed orchestrator — one background task per watched curve/token pair.
//!
//! The task owns the session's trade ledger outright; consumers only ever
//! see immutable snapshots through a `watch` channel, so no locking is
//! needed anywhere in the pipeline. Lifecycle per session:
//!
//! ```text
//! idle → checking-finalized → finalized:  backfill pool history, stop
//!                           → active:     backfill curve + pool jointly,
//!                                         then subscribe to both
//! ```
//!
//! A backfill failure publishes a single error state and parks the task
//! until the consumer calls `refetch()` or detaches — there is no
//! automatic retry loop at this level.

use std::time::Duration;

use ethers::contract::EthEvent;
use ethers::providers::Middleware;
use ethers::types::{Address, Filter, Log, ValueOrArray};
use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::abi::bonding_curve::{BondingCurve, BuyFilter, SellFilter};
use crate::chain::abi::uniswap_v3_pool::SwapFilter;
use crate::chain::logs::{retrying, BlockTimestamps, LogReader, WsProvider};
use crate::chain::pool::resolve_pool;
use crate::chain::retry::RetryConfig;
use crate::domain::candle::aggregate;
use crate::domain::trade::{
    trade_from_curve_event, trade_from_swap, wire, Trade, TradeLedger,
};
use crate::error::FeedError;
use crate::feed::{FeedContext, FeedParams, FeedSnapshot};
use crate::shared::Resolution;

// ─── Commands from the handle to the session task ────────────────────────────

enum Command {
    Refetch,
    Detach,
}

enum SessionEnd {
    Detached,
    Refetch,
}

// ─── DataFeed handle ─────────────────────────────────────────────────────────

/// Handle to a running feed session.
///
/// Dropping the handle aborts the session task, which in turn drops the log
/// subscriptions — no listener outlives its consumer. Starting a feed for a
/// different pair means spawning a new `DataFeed`; the old session's
/// teardown cannot leak trades into the new one because each session owns
/// its ledger.
pub struct DataFeed {
    snapshot_rx: watch::Receiver<FeedSnapshot>,
    cmd_tx: mpsc::Sender<Command>,
    task: Option<JoinHandle<()>>,
}

impl DataFeed {
    /// Spawn a session task for the given pair. Returns immediately; the
    /// first snapshot is the loading state.
    pub(crate) fn spawn(ctx: FeedContext, params: FeedParams) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::loading());
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let session = Session {
            ctx,
            params,
            snapshot_tx,
            cmd_rx,
            ledger: TradeLedger::new(),
            timestamps: BlockTimestamps::new(),
            pool: None,
        };
        let task = tokio::spawn(run_session(session));

        Self {
            snapshot_rx,
            cmd_tx,
            task: Some(task),
        }
    }

    /// The current view: trades, candles, loading/error state.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Re-run the backfill from scratch. This is the only way out of an
    /// error state — the session never retries on its own.
    pub fn refetch(&self) -> Result<(), FeedError> {
        self.cmd_tx
            .try_send(Command::Refetch)
            .map_err(|_| FeedError::Subscribe("feed session is gone".into()))
    }

    /// Gracefully stop the session, waiting for its task to finish.
    pub async fn detach(mut self) {
        let _ = self.cmd_tx.send(Command::Detach).await;
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
        }
    }
}

impl Drop for DataFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ─── Backfill plan ───────────────────────────────────────────────────────────

/// What a session round touches, decided once the finalized flag and the
/// pool lookup are known. Finalization is terminal chart state: the curve
/// emits nothing further and live subscriptions are pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BackfillPlan {
    pub curve: bool,
    pub pool: bool,
    pub subscribe: bool,
}

impl BackfillPlan {
    pub(crate) fn for_state(finalized: bool, pool_exists: bool) -> Self {
        Self {
            curve: !finalized,
            pool: pool_exists,
            subscribe: !finalized,
        }
    }
}

// ─── Session task ────────────────────────────────────────────────────────────

struct Session {
    ctx: FeedContext,
    params: FeedParams,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    cmd_rx: mpsc::Receiver<Command>,
    ledger: TradeLedger,
    timestamps: BlockTimestamps,
    pool: Option<Address>,
}

async fn run_session(mut session: Session) {
    loop {
        match run_once(&mut session).await {
            SessionEnd::Detached => {
                info!("feed session detached");
                return;
            }
            SessionEnd::Refetch => {
                info!("refetching feed");
                session.ledger.clear();
            }
        }
    }
}

async fn run_once(session: &mut Session) -> SessionEnd {
    session.snapshot_tx.send_replace(FeedSnapshot::loading());

    let plan = match backfill(session).await {
        Ok(plan) => plan,
        Err(e) => {
            warn!(%e, "backfill failed");
            session.ledger.clear();
            session.snapshot_tx.send_replace(FeedSnapshot {
                error: Some(e.to_string()),
                pool_address: session.pool,
                ..FeedSnapshot::default()
            });
            return park(&mut session.cmd_rx).await;
        }
    };

    publish(
        &session.snapshot_tx,
        &session.ledger,
        session.params.resolution,
        session.pool,
    );

    if !plan.subscribe {
        return park(&mut session.cmd_rx).await;
    }

    run_live(session).await
}

/// Historical phase: read the finalized flag, resolve the pool, then fetch
/// both sources jointly. Nothing partial is ever published.
async fn backfill(session: &mut Session) -> Result<BackfillPlan, FeedError> {
    let Session {
        ctx,
        params,
        timestamps,
        ledger,
        pool,
        ..
    } = session;
    let provider = ctx.provider.clone();

    let curve = BondingCurve::new(params.curve_address, provider.clone());
    let finalized = retrying(&ctx.retry, "finalized", || {
        let call = curve.finalized();
        async move { call.call().await }
    })
    .await?;

    *pool = retrying(&ctx.retry, "getPool", || {
        resolve_pool(
            provider.clone(),
            ctx.factory,
            params.agent_address,
            ctx.counter_asset,
            ctx.pool_fee,
        )
    })
    .await?;

    let plan = BackfillPlan::for_state(finalized, pool.is_some());
    info!(finalized, pool = ?pool, "feed state checked");

    let latest = retrying(&ctx.retry, "blockNumber", || provider.get_block_number())
        .await?
        .as_u64();

    let reader = LogReader::new(provider.clone(), ctx.log_span, ctx.retry.clone());
    let curve_logs = async {
        if plan.curve {
            reader
                .logs(&curve_filter(params.curve_address), params.deploy_block, latest)
                .await
        } else {
            Ok(Vec::new())
        }
    };
    let pool_logs = async {
        match *pool {
            Some(address) if plan.pool => {
                reader
                    .logs(&swap_filter(address), params.deploy_block, latest)
                    .await
            }
            _ => Ok(Vec::new()),
        }
    };

    let (curve_logs, pool_logs) = tokio::try_join!(curve_logs, pool_logs)?;
    info!(
        curve = curve_logs.len(),
        pool = pool_logs.len(),
        "backfill logs fetched"
    );

    let mut trades = Vec::new();
    for log in &curve_logs {
        trades.extend(normalize_curve_log(&provider, &ctx.retry, timestamps, log).await);
    }
    for log in &pool_logs {
        trades.extend(
            normalize_pool_log(&provider, &ctx.retry, timestamps, params.token_decimals, log)
                .await,
        );
    }

    ledger.merge(trades);
    Ok(plan)
}

/// Live phase: hold one subscription per source and fold events into the
/// ledger until a command or a broken stream ends the round.
async fn run_live(session: &mut Session) -> SessionEnd {
    let Session {
        ctx,
        params,
        snapshot_tx,
        cmd_rx,
        ledger,
        timestamps,
        pool,
    } = session;
    let provider = ctx.provider.clone();

    let mut curve_stream = match provider.subscribe_logs(&curve_filter(params.curve_address)).await
    {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%e, "curve subscription failed");
            publish_error(snapshot_tx, *pool, FeedError::Subscribe(e.to_string()));
            return park(cmd_rx).await;
        }
    };

    let mut pool_stream = match *pool {
        Some(address) => match provider.subscribe_logs(&swap_filter(address)).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(%e, "pool subscription failed");
                publish_error(snapshot_tx, *pool, FeedError::Subscribe(e.to_string()));
                drop(curve_stream);
                return park(cmd_rx).await;
            }
        },
        None => None,
    };

    info!("live subscriptions established");

    loop {
        tokio::select! {
            maybe_log = curve_stream.next() => match maybe_log {
                Some(log) => {
                    if let Some(trade) =
                        normalize_curve_log(&provider, &ctx.retry, timestamps, &log).await
                    {
                        if ledger.insert(trade) {
                            publish(snapshot_tx, ledger, params.resolution, *pool);
                        }
                    }
                }
                None => {
                    warn!("curve subscription ended");
                    publish_error(snapshot_tx, *pool, FeedError::Subscribe("event stream ended".into()));
                    drop(curve_stream);
                    drop(pool_stream);
                    return park(cmd_rx).await;
                }
            },

            maybe_log = next_or_pending(&mut pool_stream) => match maybe_log {
                Some(log) => {
                    if let Some(trade) = normalize_pool_log(
                        &provider,
                        &ctx.retry,
                        timestamps,
                        params.token_decimals,
                        &log,
                    )
                    .await
                    {
                        if ledger.insert(trade) {
                            publish(snapshot_tx, ledger, params.resolution, *pool);
                        }
                    }
                }
                None => {
                    warn!("pool subscription ended");
                    publish_error(snapshot_tx, *pool, FeedError::Subscribe("event stream ended".into()));
                    drop(curve_stream);
                    drop(pool_stream);
                    return park(cmd_rx).await;
                }
            },

            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Refetch) => return SessionEnd::Refetch,
                Some(Command::Detach) | None => return SessionEnd::Detached,
            },
        }
    }
}

/// Poll the pool stream if there is one; otherwise stay pending so the
/// select loop ignores this arm.
async fn next_or_pending<S: StreamExt + Unpin>(stream: &mut Option<S>) -> Option<S::Item> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Wait for the next command while nothing is being watched.
async fn park(cmd_rx: &mut mpsc::Receiver<Command>) -> SessionEnd {
    match cmd_rx.recv().await {
        Some(Command::Refetch) => SessionEnd::Refetch,
        Some(Command::Detach) | None => SessionEnd::Detached,
    }
}

// ─── Normalization ───────────────────────────────────────────────────────────

async fn normalize_curve_log(
    provider: &WsProvider,
    retry: &RetryConfig,
    timestamps: &mut BlockTimestamps,
    log: &Log,
) -> Option<Trade> {
    let (event, meta) = wire::decode_curve_log(log)?;
    let time = resolve_time(provider, retry, timestamps, meta.block_number).await?;
    trade_from_curve_event(&event, meta, time)
}

async fn normalize_pool_log(
    provider: &WsProvider,
    retry: &RetryConfig,
    timestamps: &mut BlockTimestamps,
    token_decimals: u8,
    log: &Log,
) -> Option<Trade> {
    let (swap, meta) = wire::decode_pool_log(log)?;
    let time = resolve_time(provider, retry, timestamps, meta.block_number).await?;
    trade_from_swap(&swap, meta, time, token_decimals)
}

async fn resolve_time(
    provider: &WsProvider,
    retry: &RetryConfig,
    timestamps: &mut BlockTimestamps,
    block_number: u64,
) -> Option<u64> {
    match timestamps.get(provider, retry, block_number).await {
        Ok(time) => Some(time),
        Err(e) => {
            debug!(%e, block = block_number, "skipping event with unresolvable block");
            None
        }
    }
}

// ─── Publishing ──────────────────────────────────────────────────────────────

fn publish(
    snapshot_tx: &watch::Sender<FeedSnapshot>,
    ledger: &TradeLedger,
    resolution: Resolution,
    pool: Option<Address>,
) {
    let trades = ledger.trades().to_vec();
    let candles = aggregate(&trades, resolution);
    snapshot_tx.send_replace(FeedSnapshot {
        trades,
        candles,
        loading: false,
        error: None,
        pool_address: pool,
    });
}

fn publish_error(snapshot_tx: &watch::Sender<FeedSnapshot>, pool: Option<Address>, error: FeedError) {
    snapshot_tx.send_replace(FeedSnapshot {
        error: Some(error.to_string()),
        pool_address: pool,
        ..FeedSnapshot::default()
    });
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Buy + Sell events of one bonding curve.
fn curve_filter(address: Address) -> Filter {
    let mut filter = Filter::new().address(address);
    filter.topics[0] = Some(ValueOrArray::Array(vec![
        Some(BuyFilter::signature()),
        Some(SellFilter::signature()),
    ]));
    filter
}

/// Swap events of one pool.
fn swap_filter(pool: Address) -> Filter {
    Filter::new().address(pool).topic0(SwapFilter::signature())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalized_plan_short_circuits() {
        // Finalized: the curve is silent, only pool history matters.
        let plan = BackfillPlan::for_state(true, true);
        assert_eq!(
            plan,
            BackfillPlan {
                curve: false,
                pool: true,
                subscribe: false
            }
        );

        // Finalized but the pool lookup came up empty: nothing to fetch.
        let plan = BackfillPlan::for_state(true, false);
        assert!(!plan.curve && !plan.pool && !plan.subscribe);
    }

    #[test]
    fn test_active_plan_uses_both_sources() {
        let plan = BackfillPlan::for_state(false, true);
        assert_eq!(
            plan,
            BackfillPlan {
                curve: true,
                pool: true,
                subscribe: true
            }
        );
    }

    #[test]
    fn test_active_plan_without_pool_is_curve_only() {
        let plan = BackfillPlan::for_state(false, false);
        assert!(plan.curve && plan.subscribe && !plan.pool);
    }

    #[test]
    fn test_curve_filter_matches_both_events() {
        let filter = curve_filter(Address::zero());
        match &filter.topics[0] {
            Some(ValueOrArray::Array(topics)) => {
                assert_eq!(topics.len(), 2);
                assert!(topics.contains(&Some(BuyFilter::signature())));
                assert!(topics.contains(&Some(SellFilter::signature())));
            }
            other => panic!("expected topic array, got {other:?}"),
        }
    }

    #[test]
    fn test_swap_filter_single_topic() {
        let filter = swap_filter(Address::zero());
        match &filter.topics[0] {
            Some(ValueOrArray::Value(Some(topic))) => {
                assert_eq!(*topic, SwapFilter::signature());
            }
            other => panic!("expected single topic, got {other:?}"),
        }
    }
}

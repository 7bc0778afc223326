//! Wire types — tagged decoding of raw logs into typed contract events.
//!
//! A raw log either decodes into a known event variant or is rejected
//! whole; a malformed log can skip itself but never corrupt the batch.
//! Pending logs (no block number or log index yet) are rejected too — a
//! trade without ordering metadata cannot be placed in the ledger.

use ethers::abi::RawLog;
use ethers::contract::EthLogDecode;
use ethers::types::Log;
use tracing::debug;

use crate::chain::abi::bonding_curve::BondingCurveEvents;
use crate::chain::abi::uniswap_v3_pool::SwapFilter;

/// Chain position of a decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventMeta {
    fn from_log(log: &Log) -> Option<Self> {
        match (log.block_number, log.log_index) {
            (Some(block), Some(index)) => Some(Self {
                block_number: block.as_u64(),
                log_index: index.as_u64(),
            }),
            _ => {
                debug!("skipping pending log without chain position");
                None
            }
        }
    }
}

/// Decode a bonding-curve log into its Buy/Sell variant.
pub fn decode_curve_log(log: &Log) -> Option<(BondingCurveEvents, EventMeta)> {
    let meta = EventMeta::from_log(log)?;
    match BondingCurveEvents::decode_log(&raw_log(log)) {
        Ok(event) => Some((event, meta)),
        Err(e) => {
            debug!(%e, block = meta.block_number, "skipping undecodable curve log");
            None
        }
    }
}

/// Decode a pool log into a Swap event.
pub fn decode_pool_log(log: &Log) -> Option<(SwapFilter, EventMeta)> {
    let meta = EventMeta::from_log(log)?;
    match SwapFilter::decode_log(&raw_log(log)) {
        Ok(swap) => Some((swap, meta)),
        Err(e) => {
            debug!(%e, block = meta.block_number, "skipping undecodable pool log");
            None
        }
    }
}

fn raw_log(log: &Log) -> RawLog {
    RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    }
}

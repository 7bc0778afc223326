//! Unified SDK error types.

use crate::shared::scaling::ScalingError;
use ethers::abi::Error as AbiError;
use ethers::contract::ContractError;
use ethers::providers::{Provider, ProviderError, Ws};
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ProviderError),

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("log decode failed: {0}")]
    Decode(#[from] AbiError),

    #[error("scaling error: {0}")]
    Scaling(#[from] ScalingError),

    #[error("subscription failed: {0}")]
    Subscribe(String),

    #[error("block {0} not found")]
    MissingBlock(u64),

    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl From<ContractError<Provider<Ws>>> for FeedError {
    fn from(value: ContractError<Provider<Ws>>) -> Self {
        Self::Contract(value.to_string())
    }
}

impl FeedError {
    /// Whether a fresh attempt at the same read could plausibly succeed.
    ///
    /// Decode and scaling failures are deterministic — retrying the same
    /// log yields the same result — so only transport-level errors count.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FeedError::Rpc(_) | FeedError::Contract(_) | FeedError::MissingBlock(_)
        )
    }
}

//! JSON-RPC boundary of the fee estimator.
//!
//! This module defines the node queries the estimator depends on behind the
//! [`FeeDataSource`] trait. Responses are handed back as raw JSON values so that
//! every numeric representation is interpreted in one place, by the normalizer
//! in `fee-types`, rather than by each backend.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
	/// The request could not be sent or the node returned a JSON-RPC error.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The node answered with a payload of an unexpected shape.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The data source could not be built from configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Block reference accepted by the queries in [`FeeDataSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
	/// Most recent confirmed block.
	Latest,
	/// Speculative block currently being built by the node.
	Pending,
}

impl BlockTag {
	pub fn as_str(&self) -> &'static str {
		match self {
			BlockTag::Latest => "latest",
			BlockTag::Pending => "pending",
		}
	}
}

impl fmt::Display for BlockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Trait defining the node queries used for fee estimation.
///
/// Implementations must be safe to share between concurrent estimations.
#[async_trait]
pub trait FeeDataSource: Send + Sync {
	/// Queries `eth_feeHistory` for the `block_count` blocks ending at `newest`.
	///
	/// Returns the raw response object; its `reward` member is block-major with
	/// one entry per requested percentile.
	async fn fee_history(
		&self,
		block_count: u64,
		newest: BlockTag,
		percentiles: &[f64],
	) -> Result<serde_json::Value, RpcError>;

	/// Queries `eth_maxPriorityFeePerGas`, the node's own tip suggestion.
	async fn max_priority_fee(&self) -> Result<serde_json::Value, RpcError>;

	/// Queries `eth_getBlockByNumber` without transaction bodies.
	///
	/// Returns `Value::Null` when the node does not know the block.
	async fn block(&self, tag: BlockTag) -> Result<serde_json::Value, RpcError>;
}


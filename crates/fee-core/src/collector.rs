//! Collection of priority fee signals from the node.
//!
//! Both signals are optional inputs to tip estimation. Any failure here is
//! logged and absorbed: the caller receives an empty sample set or `None`,
//! never an error.

use crate::retry::{retry_with_delay, RetryPolicy};
use fee_rpc::{BlockTag, FeeDataSource, RpcError};
use fee_types::{normalize, RawFeeSample, WeiAmount};
use serde_json::Value;
use std::sync::Arc;

/// Queries the node for historical rewards and its suggested tip.
pub struct SignalCollector {
	source: Arc<dyn FeeDataSource>,
	retry: RetryPolicy,
}

impl SignalCollector {
	pub fn new(source: Arc<dyn FeeDataSource>, retry: RetryPolicy) -> Self {
		Self { source, retry }
	}

	/// Collects per-block rewards at `percentile` over the last
	/// `lookback_blocks` confirmed blocks.
	///
	/// The window ends at the latest confirmed block because pending-block
	/// rewards are not final. Values that fail to normalize are dropped, so the
	/// result may be shorter than the window or empty.
	pub async fn collect_historical(&self, lookback_blocks: u64, percentile: f64) -> Vec<WeiAmount> {
		let source = &self.source;
		let percentiles = [percentile];
		let percentiles = &percentiles;

		let response = retry_with_delay(&self.retry, "eth_feeHistory", move || {
			source.fee_history(lookback_blocks, BlockTag::Latest, percentiles)
		})
		.await;

		match response {
			Ok(history) => {
				let samples = flatten_rewards(&history);
				tracing::debug!(
					lookback_blocks,
					percentile,
					samples = samples.len(),
					"Collected historical rewards"
				);
				samples
			},
			Err(e) => {
				tracing::warn!(error = %e, "Fee history unavailable, continuing without it");
				Vec::new()
			},
		}
	}

	/// Asks the node for its suggested priority fee.
	///
	/// A response that cannot be normalized counts as a failed attempt.
	/// Returns `None` once all attempts are exhausted.
	pub async fn collect_node_suggested_tip(&self) -> Option<WeiAmount> {
		let source = &self.source;

		let result = retry_with_delay(&self.retry, "eth_maxPriorityFeePerGas", move || async move {
			let raw = source.max_priority_fee().await?;
			normalize(&RawFeeSample::from(&raw)).ok_or_else(|| {
				RpcError::InvalidResponse(format!("unusable priority fee value {}", raw))
			})
		})
		.await;

		match result {
			Ok(tip) => {
				tracing::debug!(tip = %tip, "Collected node suggested tip");
				Some(tip)
			},
			Err(e) => {
				tracing::warn!(error = %e, "Node tip suggestion unavailable, continuing without it");
				None
			},
		}
	}
}

/// Flattens the block-major `reward` matrix of a fee history response.
///
/// Blocks without rewards and values that do not normalize are skipped.
fn flatten_rewards(history: &Value) -> Vec<WeiAmount> {
	let Some(blocks) = history.get("reward").and_then(Value::as_array) else {
		return Vec::new();
	};

	blocks
		.iter()
		.filter_map(Value::as_array)
		.flatten()
		.filter_map(|reward| normalize(&RawFeeSample::from(reward)))
		.collect()
}

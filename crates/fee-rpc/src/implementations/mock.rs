//! Scripted in-memory fee data source.
//!
//! Responses are queued per query. Each call consumes the front of its queue,
//! except that the last queued response is kept and replayed for every later
//! call. This lets a test describe "fails twice, then succeeds" or "always
//! fails" without a live node.

use crate::{BlockTag, FeeDataSource, RpcError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Arguments of one recorded `fee_history` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeHistoryRequest {
	pub block_count: u64,
	pub newest: BlockTag,
	pub percentiles: Vec<f64>,
}

#[derive(Default)]
struct Script {
	responses: Mutex<VecDeque<Result<Value, RpcError>>>,
	calls: AtomicUsize,
}

impl Script {
	fn push(&self, response: Result<Value, RpcError>) {
		self.responses
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push_back(response);
	}

	fn next(&self, query: &str) -> Result<Value, RpcError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
		if responses.len() > 1 {
			responses
				.pop_front()
				.unwrap_or_else(|| Err(RpcError::Transport(format!("{} not scripted", query))))
		} else {
			responses
				.front()
				.cloned()
				.unwrap_or_else(|| Err(RpcError::Transport(format!("{} not scripted", query))))
		}
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

/// In-memory data source returning scripted responses.
#[derive(Default)]
pub struct ScriptedFeeSource {
	fee_history: Script,
	max_priority_fee: Script,
	pending_block: Script,
	latest_block: Script,
	/// Artificial delay applied before every response.
	latency: Option<Duration>,
	fee_history_requests: Mutex<Vec<FeeHistoryRequest>>,
}

impl ScriptedFeeSource {
	/// Creates a source with nothing scripted; every query fails until
	/// responses are queued.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a response for `eth_feeHistory`.
	pub fn with_fee_history(self, response: Result<Value, RpcError>) -> Self {
		self.fee_history.push(response);
		self
	}

	/// Queues a response for `eth_maxPriorityFeePerGas`.
	pub fn with_max_priority_fee(self, response: Result<Value, RpcError>) -> Self {
		self.max_priority_fee.push(response);
		self
	}

	/// Queues a response for `eth_getBlockByNumber` with the given tag.
	pub fn with_block(self, tag: BlockTag, response: Result<Value, RpcError>) -> Self {
		self.block_script(tag).push(response);
		self
	}

	/// Delays every response by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn fee_history_calls(&self) -> usize {
		self.fee_history.calls()
	}

	pub fn max_priority_fee_calls(&self) -> usize {
		self.max_priority_fee.calls()
	}

	pub fn block_calls(&self, tag: BlockTag) -> usize {
		self.block_script(tag).calls()
	}

	/// Returns the arguments of every `fee_history` call so far.
	pub fn fee_history_requests(&self) -> Vec<FeeHistoryRequest> {
		self.fee_history_requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	fn block_script(&self, tag: BlockTag) -> &Script {
		match tag {
			BlockTag::Pending => &self.pending_block,
			BlockTag::Latest => &self.latest_block,
		}
	}

	async fn simulate_latency(&self) {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl FeeDataSource for ScriptedFeeSource {
	async fn fee_history(
		&self,
		block_count: u64,
		newest: BlockTag,
		percentiles: &[f64],
	) -> Result<Value, RpcError> {
		self.fee_history_requests
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(FeeHistoryRequest {
				block_count,
				newest,
				percentiles: percentiles.to_vec(),
			});
		self.simulate_latency().await;
		self.fee_history.next("eth_feeHistory")
	}

	async fn max_priority_fee(&self) -> Result<Value, RpcError> {
		self.simulate_latency().await;
		self.max_priority_fee.next("eth_maxPriorityFeePerGas")
	}

	async fn block(&self, tag: BlockTag) -> Result<Value, RpcError> {
		self.simulate_latency().await;
		self.block_script(tag).next("eth_getBlockByNumber")
	}
}

/// Builds an `eth_feeHistory` response carrying the given block-major rewards.
pub fn fee_history_response(rewards: Value) -> Value {
	json!({
		"oldestBlock": "0x1",
		"reward": rewards,
		"baseFeePerGas": [],
		"gasUsedRatio": [],
	})
}

/// Builds a block response with `baseFeePerGas` set to `base_fee`.
pub fn block_response(base_fee: Value) -> Value {
	json!({
		"number": "0x10",
		"baseFeePerGas": base_fee,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_last_response_is_sticky() {
		let source = ScriptedFeeSource::new()
			.with_max_priority_fee(Err(RpcError::Transport("down".into())))
			.with_max_priority_fee(Ok(json!("0x5")));

		assert!(source.max_priority_fee().await.is_err());
		assert_eq!(source.max_priority_fee().await.unwrap(), json!("0x5"));
		assert_eq!(source.max_priority_fee().await.unwrap(), json!("0x5"));
		assert_eq!(source.max_priority_fee_calls(), 3);
	}

	#[tokio::test]
	async fn test_unscripted_query_fails() {
		let source = ScriptedFeeSource::new();
		assert!(matches!(
			source.block(BlockTag::Pending).await,
			Err(RpcError::Transport(_))
		));
		assert_eq!(source.block_calls(BlockTag::Pending), 1);
		assert_eq!(source.block_calls(BlockTag::Latest), 0);
	}

	#[tokio::test]
	async fn test_records_fee_history_arguments() {
		let source = ScriptedFeeSource::new()
			.with_fee_history(Ok(fee_history_response(json!([["0x1"]]))));

		source
			.fee_history(8, BlockTag::Latest, &[40.0])
			.await
			.unwrap();

		assert_eq!(
			source.fee_history_requests(),
			vec![FeeHistoryRequest {
				block_count: 8,
				newest: BlockTag::Latest,
				percentiles: vec![40.0],
			}]
		);
	}
}

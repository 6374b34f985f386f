//! Base fee lookup and worst-case projection.
//!
//! Under EIP-1559 the base fee can grow by at most 1/8 per block. Projecting
//! the current value forward by the maximum rate gives a ceiling that stays
//! valid while the transaction waits a few blocks for inclusion.

use crate::math::{mul_div_ceil, WideUint};
use crate::retry::{retry_with_delay, RetryPolicy};
use crate::EstimationError;
use fee_rpc::{BlockTag, FeeDataSource, RpcError};
use fee_types::{normalize, RawFeeSample, WeiAmount};
use serde_json::Value;
use std::sync::Arc;

/// Block fields that may carry the base fee, in order of preference.
const BASE_FEE_FIELDS: [&str; 2] = ["baseFeePerGas", "baseFee"];

/// Block tags tried on each attempt, in order of preference.
const BASE_FEE_TAGS: [BlockTag; 2] = [BlockTag::Pending, BlockTag::Latest];

/// Fetches the current base fee and projects it forward.
pub struct BaseFeeProjector {
	source: Arc<dyn FeeDataSource>,
	retry: RetryPolicy,
}

impl BaseFeeProjector {
	pub fn new(source: Arc<dyn FeeDataSource>, retry: RetryPolicy) -> Self {
		Self { source, retry }
	}

	/// Reads the base fee of the pending block, falling back to the latest
	/// block within the same attempt.
	///
	/// Fails with [`EstimationError::NodeUnavailable`] once every attempt has
	/// failed for both tags.
	pub async fn fetch_current_base_fee(&self) -> Result<WeiAmount, EstimationError> {
		let source = &self.source;

		retry_with_delay(&self.retry, "base fee lookup", move || async move {
			let mut failures = Vec::with_capacity(BASE_FEE_TAGS.len());
			for tag in BASE_FEE_TAGS {
				match source.block(tag).await.and_then(|block| base_fee_of(&block, tag)) {
					Ok(base_fee) => {
						tracing::debug!(%tag, base_fee = %base_fee, "Fetched current base fee");
						return Ok(base_fee);
					},
					Err(e) => {
						tracing::debug!(%tag, error = %e, "Base fee unavailable for block tag");
						failures.push(format!("{}: {}", tag, e));
					},
				}
			}
			Err(RpcError::InvalidResponse(failures.join("; ")))
		})
		.await
		.map_err(|e| EstimationError::NodeUnavailable(e.to_string()))
	}
}

/// Extracts and normalizes the base fee from a block object.
fn base_fee_of(block: &Value, tag: BlockTag) -> Result<WeiAmount, RpcError> {
	if block.is_null() {
		return Err(RpcError::InvalidResponse(format!("no {} block", tag)));
	}

	BASE_FEE_FIELDS
		.iter()
		.filter_map(|field| block.get(field))
		.find_map(|value| normalize(&RawFeeSample::from(value)))
		.ok_or_else(|| RpcError::InvalidResponse(format!("{} block has no usable base fee", tag)))
}

/// From this many blocks on, `(9/8)^n` alone exceeds `U256::MAX`.
const SATURATING_BUMP_BLOCKS: u32 = 1507;

/// Projects `current` forward by `bump_blocks` blocks of maximum growth.
///
/// Returns `ceil(current * (9/8)^bump_blocks)`, saturating at the largest
/// representable amount. Zero blocks returns `current` unchanged, and the
/// result never decreases as `bump_blocks` grows.
pub fn project_max_base_fee(current: WeiAmount, bump_blocks: u32) -> WeiAmount {
	if current.is_zero() {
		return current;
	}
	if bump_blocks >= SATURATING_BUMP_BLOCKS {
		return WeiAmount::MAX;
	}

	let exponent = WideUint::from(bump_blocks);
	let (Some(numerator), Some(denominator)) = (
		WideUint::from(9u8).checked_pow(exponent),
		WideUint::from(8u8).checked_pow(exponent),
	) else {
		return WeiAmount::MAX;
	};
	mul_div_ceil(current, numerator, denominator)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use fee_rpc::implementations::mock::{block_response, ScriptedFeeSource};
	use serde_json::json;
	use std::time::Duration;

	fn policy() -> RetryPolicy {
		RetryPolicy::new(3, Duration::from_millis(200))
	}

	#[test]
	fn test_projection_two_blocks() {
		// 100 gwei * 81 / 64
		assert_eq!(
			project_max_base_fee(U256::from(100_000_000_000u64), 2),
			U256::from(126_562_500_000u64)
		);
	}

	#[test]
	fn test_projection_rounds_up() {
		// 1 * 9 / 8 = 1.125
		assert_eq!(project_max_base_fee(U256::from(1u64), 1), U256::from(2u64));
		assert_eq!(project_max_base_fee(U256::ZERO, 5), U256::ZERO);
	}

	#[test]
	fn test_projection_identity_and_monotonic() {
		let base = U256::from(37_123_456_789u64);
		assert_eq!(project_max_base_fee(base, 0), base);

		let mut previous = base;
		for n in 1..=12 {
			let projected = project_max_base_fee(base, n);
			assert!(projected >= previous);
			previous = projected;
		}
	}

	#[test]
	fn test_projection_saturates() {
		assert_eq!(project_max_base_fee(U256::MAX, 64), U256::MAX);
		let base = U256::from(1u64) << 250;
		assert_eq!(project_max_base_fee(base, 64), U256::MAX);
		assert_eq!(project_max_base_fee(base, 100), U256::MAX);
		assert_eq!(project_max_base_fee(U256::from(1u64), u32::MAX), U256::MAX);
	}

	#[test]
	fn test_projection_exact_past_512_bit_products() {
		// 100 * 9^161 needs more than 512 bits but the result is about 2^34
		let projected = project_max_base_fee(U256::from(100u64), 161);
		assert!(projected > U256::from(1u64) << 33);
		assert!(projected < U256::from(1u64) << 35);
	}

	#[test]
	fn test_projection_saturation_boundary() {
		let one = U256::from(1u64);
		assert!(project_max_base_fee(one, SATURATING_BUMP_BLOCKS - 1) < U256::MAX);
		assert_eq!(project_max_base_fee(one, SATURATING_BUMP_BLOCKS), U256::MAX);
	}

	#[test]
	fn test_projection_never_decreases_with_horizon() {
		let bases = [
			U256::from(1u64),
			U256::from(100_000_000_000u64),
			U256::from(1u64) << 250,
			U256::MAX,
		];
		for base in bases {
			let mut previous = project_max_base_fee(base, 0);
			assert_eq!(previous, base);
			for n in 1..=400 {
				let projected = project_max_base_fee(base, n);
				assert!(
					projected >= previous,
					"projection of {} dropped at n={}: {} -> {}",
					base,
					n,
					previous,
					projected
				);
				previous = projected;
			}
		}
	}

	#[test]
	fn test_base_fee_field_aliases() {
		assert_eq!(
			base_fee_of(&json!({"baseFeePerGas": "0x64"}), BlockTag::Pending).unwrap(),
			U256::from(100u64)
		);
		assert_eq!(
			base_fee_of(&json!({"baseFee": 250}), BlockTag::Latest).unwrap(),
			U256::from(250u64)
		);
		// An unusable preferred field falls through to the alias
		assert_eq!(
			base_fee_of(&json!({"baseFeePerGas": null, "baseFee": "0x10"}), BlockTag::Latest)
				.unwrap(),
			U256::from(16u64)
		);
		assert!(base_fee_of(&json!({"number": "0x1"}), BlockTag::Latest).is_err());
		assert!(base_fee_of(&Value::Null, BlockTag::Pending).is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn test_prefers_pending_block() {
		let source = Arc::new(
			ScriptedFeeSource::new()
				.with_block(BlockTag::Pending, Ok(block_response(json!("0x3b9aca00"))))
				.with_block(BlockTag::Latest, Ok(block_response(json!("0x1")))),
		);
		let projector = BaseFeeProjector::new(source.clone(), policy());

		let base_fee = projector.fetch_current_base_fee().await.unwrap();

		assert_eq!(base_fee, U256::from(1_000_000_000u64));
		assert_eq!(source.block_calls(BlockTag::Latest), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_falls_back_to_latest_block() {
		let source = Arc::new(
			ScriptedFeeSource::new()
				.with_block(BlockTag::Pending, Ok(Value::Null))
				.with_block(BlockTag::Latest, Ok(block_response(json!("0x174876e800")))),
		);
		let projector = BaseFeeProjector::new(source.clone(), policy());

		let base_fee = projector.fetch_current_base_fee().await.unwrap();

		assert_eq!(base_fee, U256::from(100_000_000_000u64));
		assert_eq!(source.block_calls(BlockTag::Pending), 1);
		assert_eq!(source.block_calls(BlockTag::Latest), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_unavailable_after_all_attempts() {
		let source = Arc::new(
			ScriptedFeeSource::new()
				.with_block(BlockTag::Pending, Err(RpcError::Transport("refused".into())))
				.with_block(BlockTag::Latest, Ok(block_response(Value::Null))),
		);
		let projector = BaseFeeProjector::new(source.clone(), policy());
		let start = tokio::time::Instant::now();

		let result = projector.fetch_current_base_fee().await;

		assert!(matches!(result, Err(EstimationError::NodeUnavailable(_))));
		assert_eq!(source.block_calls(BlockTag::Pending), 3);
		assert_eq!(source.block_calls(BlockTag::Latest), 3);
		assert_eq!(start.elapsed(), Duration::from_millis(400));
	}
}

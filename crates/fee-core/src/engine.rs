//! Orchestration of a single fee recommendation.

use crate::collector::SignalCollector;
use crate::projector::{project_max_base_fee, BaseFeeProjector};
use crate::retry::RetryPolicy;
use crate::tip::TipEstimator;
use crate::EstimationError;
use fee_config::Config;
use fee_rpc::FeeDataSource;
use fee_types::FeeRecommendation;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Produces fee recommendations from a node.
///
/// The engine holds no state between calls beyond its configuration, so one
/// instance can serve any number of concurrent estimations.
pub struct FeeRecommendationEngine {
	collector: SignalCollector,
	projector: BaseFeeProjector,
	tip_estimator: TipEstimator,
	lookback_blocks: u64,
	reward_percentile: f64,
	bump_blocks: u32,
	deadline: Duration,
}

impl FeeRecommendationEngine {
	pub fn new(source: Arc<dyn FeeDataSource>, config: &Config) -> Self {
		let retry = RetryPolicy::from(&config.retry);
		let estimator = &config.estimator;

		Self {
			collector: SignalCollector::new(source.clone(), retry),
			projector: BaseFeeProjector::new(source, retry),
			tip_estimator: TipEstimator::new(estimator),
			lookback_blocks: estimator.lookback_blocks,
			reward_percentile: estimator.reward_percentile,
			bump_blocks: estimator.base_fee_bump_blocks,
			deadline: Duration::from_secs(estimator.deadline_seconds),
		}
	}

	/// Computes a fee recommendation.
	///
	/// Fails only if the base fee cannot be determined or the whole
	/// estimation runs past its deadline. On success the returned
	/// `max_fee` always equals the projected base fee plus `tip`.
	#[instrument(skip_all)]
	pub async fn recommend(&self) -> Result<FeeRecommendation, EstimationError> {
		match tokio::time::timeout(self.deadline, self.estimate()).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(deadline = ?self.deadline, "Fee estimation timed out");
				Err(EstimationError::DeadlineExceeded(self.deadline))
			},
		}
	}

	async fn estimate(&self) -> Result<FeeRecommendation, EstimationError> {
		let base_fee = self.projector.fetch_current_base_fee().await?;

		let (historical, node_suggested) = tokio::join!(
			self.collector
				.collect_historical(self.lookback_blocks, self.reward_percentile),
			self.collector.collect_node_suggested_tip(),
		);

		let tip = self.tip_estimator.estimate_tip(&historical, node_suggested);
		let projected_base_fee = project_max_base_fee(base_fee, self.bump_blocks);
		let max_fee = projected_base_fee.saturating_add(tip);

		let recommendation = FeeRecommendation {
			base_fee,
			tip,
			max_fee,
		};
		debug_assert!(recommendation.is_consistent());

		tracing::info!(
			base_fee = %base_fee,
			tip = %tip,
			projected_base_fee = %projected_base_fee,
			max_fee = %max_fee,
			"Computed fee recommendation"
		);

		Ok(recommendation)
	}
}

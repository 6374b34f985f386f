//! Priority fee estimation.
//!
//! Turns the historical reward samples and the node's own suggestion into a
//! single tip. Each signal is capped and buffered on its own, the configured
//! selection policy picks one, and the cap is enforced once more on the
//! result. Missing signals are handled by a fixed fallback tip, so estimation
//! itself cannot fail.

use crate::math::mul_div_round_half_up;
use alloy_primitives::U256;
use fee_config::EstimatorConfig;
use fee_types::{TipCandidate, TipSelection, TipSource, WeiAmount};

/// Percentiles are carried in hundredths of a percent to keep interpolation exact.
const PERCENTILE_SCALE: u64 = 10_000;
const BPS_SCALE: u64 = 10_000;

/// Returns the `percentile`-th value of `samples` with linear interpolation.
///
/// For `n` sorted samples the position is `k = (n - 1) * percentile / 100`.
/// When `k` falls between two order statistics the value is interpolated
/// between them and rounded half-up to a whole wei. Returns `None` for an
/// empty slice.
///
/// `percentile` is resolved to hundredths of a percent; finer digits are
/// rounded away, so 33.333 behaves as 33.33.
pub fn percentile(samples: &[WeiAmount], percentile: f64) -> Option<WeiAmount> {
	if samples.is_empty() {
		return None;
	}

	let mut sorted = samples.to_vec();
	sorted.sort_unstable();

	let hundredths = (percentile.clamp(0.0, 100.0) * 100.0).round() as u64;
	let scaled_position = (sorted.len() as u64 - 1) * hundredths;
	let lower_index = (scaled_position / PERCENTILE_SCALE) as usize;
	let remainder = scaled_position % PERCENTILE_SCALE;

	let lower = sorted[lower_index];
	if remainder == 0 {
		return Some(lower);
	}

	let upper = sorted[lower_index + 1];
	let offset = mul_div_round_half_up(
		upper - lower,
		U256::from(remainder),
		U256::from(PERCENTILE_SCALE),
	);
	Some(lower + offset)
}

/// Adds a proportional buffer of `buffer_bps` basis points, rounding half-up.
pub fn apply_buffer(amount: WeiAmount, buffer_bps: u32) -> WeiAmount {
	mul_div_round_half_up(
		amount,
		U256::from(BPS_SCALE + buffer_bps as u64),
		U256::from(BPS_SCALE),
	)
}

/// Combines tip signals into one priority fee.
#[derive(Debug, Clone)]
pub struct TipEstimator {
	reward_percentile: f64,
	buffer_bps: u32,
	cap: WeiAmount,
	fallback: WeiAmount,
	selection: TipSelection,
}

impl TipEstimator {
	pub fn new(config: &EstimatorConfig) -> Self {
		Self {
			reward_percentile: config.reward_percentile,
			buffer_bps: config.priority_fee_buffer_bps,
			cap: U256::from(config.priority_fee_cap_wei),
			fallback: U256::from(config.fallback_tip_wei),
			selection: config.tip_selection,
		}
	}

	/// The hard upper bound applied to every tip this estimator returns.
	pub fn cap(&self) -> WeiAmount {
		self.cap
	}

	/// Chooses the tip from the historical samples and the node suggestion.
	///
	/// The result never exceeds the configured cap.
	pub fn estimate_tip(
		&self,
		historical_samples: &[WeiAmount],
		node_suggested: Option<WeiAmount>,
	) -> WeiAmount {
		let historical = percentile(historical_samples, self.reward_percentile)
			.map(|value| self.candidate(TipSource::Historical, value));
		let node = node_suggested.map(|value| self.candidate(TipSource::NodeSuggested, value));

		let candidates: Vec<TipCandidate> = historical.into_iter().chain(node).collect();

		let tip = match self.selection.select(&candidates) {
			Some(chosen) => {
				tracing::debug!(
					source = %chosen.source,
					amount = %chosen.amount,
					candidates = candidates.len(),
					policy = ?self.selection,
					"Selected priority fee candidate"
				);
				chosen.amount
			},
			None => {
				tracing::debug!(
					fallback = %self.fallback,
					"No priority fee signal available, using fallback tip"
				);
				self.fallback
			},
		};

		tip.min(self.cap)
	}

	/// Caps a raw signal, then applies the safety buffer.
	fn candidate(&self, source: TipSource, value: WeiAmount) -> TipCandidate {
		let capped = value.min(self.cap);
		TipCandidate::new(source, apply_buffer(capped, self.buffer_bps))
	}
}

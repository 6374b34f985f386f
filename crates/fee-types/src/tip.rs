//! Priority fee candidates and the policy used to combine them.

use crate::WeiAmount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a priority fee candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipSource {
	/// Percentile of recent per-block rewards from fee history.
	Historical,
	/// The node's own `eth_maxPriorityFeePerGas` suggestion.
	NodeSuggested,
}

impl fmt::Display for TipSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TipSource::Historical => write!(f, "historical"),
			TipSource::NodeSuggested => write!(f, "node_suggested"),
		}
	}
}

/// A priority fee proposal from a single signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipCandidate {
	pub source: TipSource,
	pub amount: WeiAmount,
}

impl TipCandidate {
	pub fn new(source: TipSource, amount: WeiAmount) -> Self {
		Self { source, amount }
	}
}

/// How to choose between candidates when both sources produced one.
///
/// `Max` biases toward timely inclusion and is the default. `Min` is the
/// cheaper policy and may underpay when the two signals disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipSelection {
	#[default]
	Max,
	Min,
}

impl TipSelection {
	/// Picks one candidate out of `candidates`, or `None` if there are none.
	pub fn select<'a, I>(self, candidates: I) -> Option<TipCandidate>
	where
		I: IntoIterator<Item = &'a TipCandidate>,
	{
		let iter = candidates.into_iter().copied();
		match self {
			TipSelection::Max => iter.max_by_key(|c| c.amount),
			TipSelection::Min => iter.min_by_key(|c| c.amount),
		}
	}
}

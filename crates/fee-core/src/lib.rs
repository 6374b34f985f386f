//! Core fee estimation engine.
//!
//! This module turns raw node data into an EIP-1559 fee recommendation. It
//! fetches the current base fee, gathers the historical and node-suggested
//! priority fee signals concurrently, reduces them to a single capped tip and
//! projects the base fee forward to produce the `maxFeePerGas` ceiling.

use std::time::Duration;
use thiserror::Error;

pub mod collector;
pub mod engine;
mod math;
pub mod projector;
pub mod retry;
pub mod tip;

pub use engine::FeeRecommendationEngine;
pub use projector::project_max_base_fee;
pub use retry::RetryPolicy;
pub use tip::TipEstimator;

/// Errors that can abort an estimation.
///
/// Missing tip signals are not errors; they fall back to a default tip.
#[derive(Debug, Error)]
pub enum EstimationError {
	/// The base fee could not be read from the node after all attempts.
	#[error("Node unavailable: {0}")]
	NodeUnavailable(String),
	/// The estimation did not complete within its deadline.
	#[error("Deadline exceeded after {0:?}")]
	DeadlineExceeded(Duration),
}

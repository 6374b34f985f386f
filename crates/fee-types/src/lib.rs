//! Common types module for the fee estimator.
//!
//! This module defines the value types passed between the estimator crates.
//! Every value here is created per estimation call and discarded once the
//! final recommendation has been produced; nothing is persisted.

/// Fee amounts and the normalization of raw node values into them.
pub mod amount;
/// Priority fee candidates and the policy used to combine them.
pub mod tip;
/// The final fee recommendation triple.
pub mod recommendation;
/// Unit conversion and formatting helpers.
pub mod utils;

// Re-export all types for convenient access
pub use amount::{normalize, RawFeeSample, WeiAmount};
pub use recommendation::FeeRecommendation;
pub use tip::{TipCandidate, TipSelection, TipSource};
pub use utils::{format_gwei, format_units, without_0x_prefix, GWEI};

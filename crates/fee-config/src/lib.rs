//! Configuration module for the fee estimator.
//!
//! This module provides the structures used to tune fee estimation. It supports
//! loading configuration from TOML files with `${VAR}` environment variable
//! references, and validates every tuning parameter before it is used. All values
//! are read once at startup and stay immutable for the lifetime of the process.

use fee_types::{TipSelection, GWEI};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the fee estimator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Node connection settings.
	pub rpc: RpcConfig,
	/// Tuning parameters for tip estimation and base fee projection.
	#[serde(default)]
	pub estimator: EstimatorConfig,
	/// Bounded retry policy applied to node queries.
	#[serde(default)]
	pub retry: RetryConfig,
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcConfig {
	/// HTTP JSON-RPC endpoint of the node.
	pub url: String,
	/// Timeout for a single HTTP request.
	/// Defaults to 10 seconds if not specified.
	#[serde(default = "default_rpc_timeout_seconds")]
	pub timeout_seconds: u64,
}

fn default_rpc_timeout_seconds() -> u64 {
	10
}

/// Tuning parameters for fee estimation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimatorConfig {
	/// Number of recent blocks sampled from fee history.
	#[serde(default = "default_lookback_blocks")]
	pub lookback_blocks: u64,
	/// Reward percentile requested from fee history and used to summarize it.
	/// Accepts at most two decimal places, e.g. `40` or `33.33`.
	#[serde(default = "default_reward_percentile")]
	pub reward_percentile: f64,
	/// Safety buffer added on top of each tip signal, in basis points.
	#[serde(default = "default_priority_fee_buffer_bps")]
	pub priority_fee_buffer_bps: u32,
	/// Hard upper bound for the recommended tip, in wei.
	#[serde(default = "default_priority_fee_cap_wei")]
	pub priority_fee_cap_wei: u64,
	/// Tip used when neither signal is available, in wei.
	#[serde(default = "default_fallback_tip_wei")]
	pub fallback_tip_wei: u64,
	/// Number of blocks of worst-case base fee growth covered by the max fee.
	#[serde(default = "default_base_fee_bump_blocks")]
	pub base_fee_bump_blocks: u32,
	/// Which candidate wins when both tip signals are available.
	#[serde(default)]
	pub tip_selection: TipSelection,
	/// Upper bound on the duration of a whole estimation.
	#[serde(default = "default_deadline_seconds")]
	pub deadline_seconds: u64,
}

fn default_lookback_blocks() -> u64 {
	8
}

fn default_reward_percentile() -> f64 {
	40.0
}

fn default_priority_fee_buffer_bps() -> u32 {
	1000 // +10%
}

fn default_priority_fee_cap_wei() -> u64 {
	GWEI
}

fn default_fallback_tip_wei() -> u64 {
	GWEI / 10 // 0.1 gwei
}

fn default_base_fee_bump_blocks() -> u32 {
	2
}

fn default_deadline_seconds() -> u64 {
	30
}

impl Default for EstimatorConfig {
	fn default() -> Self {
		Self {
			lookback_blocks: default_lookback_blocks(),
			reward_percentile: default_reward_percentile(),
			priority_fee_buffer_bps: default_priority_fee_buffer_bps(),
			priority_fee_cap_wei: default_priority_fee_cap_wei(),
			fallback_tip_wei: default_fallback_tip_wei(),
			base_fee_bump_blocks: default_base_fee_bump_blocks(),
			tip_selection: TipSelection::default(),
			deadline_seconds: default_deadline_seconds(),
		}
	}
}

/// Bounded retry policy for node queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
	/// Total number of attempts, including the first one.
	#[serde(default = "default_retry_attempts")]
	pub attempts: u32,
	/// Fixed delay between attempts, in milliseconds.
	#[serde(default = "default_retry_delay_ms")]
	pub delay_ms: u64,
}

fn default_retry_attempts() -> u32 {
	3
}

fn default_retry_delay_ms() -> u64 {
	200
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			attempts: default_retry_attempts(),
			delay_ms: default_retry_delay_ms(),
		}
	}
}

/// Largest block count accepted by `eth_feeHistory`.
const MAX_LOOKBACK_BLOCKS: u64 = 1024;
/// Largest projection horizon, about 2.8x growth of the current base fee.
const MAX_BUMP_BLOCKS: u32 = 64;
const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_RETRY_DELAY_MS: u64 = 10_000;

/// Upper bound on the size of a configuration document.
const MAX_CONFIG_BYTES: usize = 1024 * 1024;

/// Substitutes `${VAR}` and `${VAR:-fallback}` references with values from
/// the process environment.
///
/// A reference to an unset variable without a fallback is an error naming
/// the first such variable.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_CONFIG_BYTES {
		return Err(ConfigError::Validation(format!(
			"configuration is {} bytes, limit is {}",
			input.len(),
			MAX_CONFIG_BYTES
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Invalid env reference pattern: {}", e)))?;

	let mut unresolved: Option<String> = None;
	let resolved = pattern.replace_all(input, |caps: &Captures<'_>| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(fallback)) => fallback.as_str().to_string(),
			(Err(_), None) => {
				unresolved.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match unresolved {
		Some(name) => Err(ConfigError::Validation(format!(
			"environment variable '{}' is not set and has no default",
			name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Creates a configuration for the given node URL with every tuning
	/// parameter at its default.
	pub fn for_url(url: impl Into<String>) -> Self {
		Self {
			rpc: RpcConfig {
				url: url.into(),
				timeout_seconds: default_rpc_timeout_seconds(),
			},
			estimator: EstimatorConfig::default(),
			retry: RetryConfig::default(),
		}
	}

	/// Loads configuration from a TOML file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration to ensure all values are within bounds.
	///
	/// This checks:
	/// - The RPC URL is set and the request timeout is non-zero
	/// - The fee history window fits what nodes accept
	/// - Percentile, buffer and cap are meaningful
	/// - The projection horizon and retry policy are bounded
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.rpc.url.trim().is_empty() {
			return Err(ConfigError::Validation("RPC url cannot be empty".into()));
		}
		if self.rpc.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"rpc.timeout_seconds must be greater than 0".into(),
			));
		}

		let est = &self.estimator;
		if est.lookback_blocks == 0 || est.lookback_blocks > MAX_LOOKBACK_BLOCKS {
			return Err(ConfigError::Validation(format!(
				"estimator.lookback_blocks must be between 1 and {}",
				MAX_LOOKBACK_BLOCKS
			)));
		}
		if !(0.0..=100.0).contains(&est.reward_percentile) {
			return Err(ConfigError::Validation(format!(
				"estimator.reward_percentile must be between 0 and 100, got {}",
				est.reward_percentile
			)));
		}
		let hundredths = est.reward_percentile * 100.0;
		if (hundredths - hundredths.round()).abs() > 1e-6 {
			return Err(ConfigError::Validation(format!(
				"estimator.reward_percentile supports at most two decimal places, got {}",
				est.reward_percentile
			)));
		}
		if est.priority_fee_buffer_bps > 10_000 {
			return Err(ConfigError::Validation(
				"estimator.priority_fee_buffer_bps cannot exceed 10000 (100%)".into(),
			));
		}
		if est.priority_fee_cap_wei == 0 {
			return Err(ConfigError::Validation(
				"estimator.priority_fee_cap_wei must be greater than 0".into(),
			));
		}
		if est.base_fee_bump_blocks > MAX_BUMP_BLOCKS {
			return Err(ConfigError::Validation(format!(
				"estimator.base_fee_bump_blocks cannot exceed {}",
				MAX_BUMP_BLOCKS
			)));
		}
		if est.deadline_seconds == 0 {
			return Err(ConfigError::Validation(
				"estimator.deadline_seconds must be greater than 0".into(),
			));
		}

		if self.retry.attempts == 0 || self.retry.attempts > MAX_RETRY_ATTEMPTS {
			return Err(ConfigError::Validation(format!(
				"retry.attempts must be between 1 and {}",
				MAX_RETRY_ATTEMPTS
			)));
		}
		if self.retry.delay_ms > MAX_RETRY_DELAY_MS {
			return Err(ConfigError::Validation(format!(
				"retry.delay_ms cannot exceed {}",
				MAX_RETRY_DELAY_MS
			)));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved before parsing and the result is
/// validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

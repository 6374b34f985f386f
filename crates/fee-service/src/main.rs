//! Main entry point for the fee estimator.
//!
//! This binary connects to an Ethereum JSON-RPC node, computes a single
//! EIP-1559 fee recommendation and prints it, either as human readable gwei
//! values or as a JSON object of wei amounts.

use clap::Parser;
use fee_config::{Config, ConfigError};
use fee_core::FeeRecommendationEngine;
use fee_rpc::implementations::http::create_http_source;
use fee_types::{format_gwei, FeeRecommendation};
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable older deployments use for the node endpoint.
const LEGACY_RPC_URL_ENV: &str = "ETH_INFURA";

/// Command-line arguments for the fee estimator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Node RPC endpoint, overrides the one in the configuration file.
	/// Without a configuration file, ETH_INFURA is used when this is unset
	#[arg(long, env = "ETH_RPC_URL")]
	rpc_url: Option<String>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Print the recommendation as JSON wei amounts
	#[arg(long)]
	json: bool,
}

/// Main entry point for the fee estimator.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Resolves configuration from file and flags
/// 4. Computes one recommendation and prints it
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let legacy_rpc_url = std::env::var(LEGACY_RPC_URL_ENV).ok();
	let config = resolve_config(
		args.config.as_deref(),
		args.rpc_url.as_deref(),
		legacy_rpc_url.as_deref(),
	)
	.await?;
	tracing::info!(
		url = %config.rpc.url,
		lookback_blocks = config.estimator.lookback_blocks,
		tip_selection = ?config.estimator.tip_selection,
		"Loaded configuration"
	);

	let source = create_http_source(&config.rpc)?;
	let engine = FeeRecommendationEngine::new(Arc::from(source), &config);

	let recommendation = engine.recommend().await.map_err(|e| {
		tracing::error!(error = %e, "Fee estimation failed");
		e
	})?;

	println!("{}", render(&recommendation, args.json)?);
	Ok(())
}

/// Builds the effective configuration.
///
/// A configuration file is loaded when given; `rpc_url` then replaces its
/// endpoint. Without a file, `rpc_url` alone yields a default configuration,
/// and `legacy_rpc_url` (from `ETH_INFURA`) stands in when `rpc_url` is unset.
async fn resolve_config(
	path: Option<&std::path::Path>,
	rpc_url: Option<&str>,
	legacy_rpc_url: Option<&str>,
) -> Result<Config, ConfigError> {
	let legacy_rpc_url = legacy_rpc_url.filter(|url| !url.trim().is_empty());
	let mut config = match (path, rpc_url.or(legacy_rpc_url)) {
		(Some(path), _) => Config::from_file(path).await?,
		(None, Some(url)) => Config::for_url(url),
		(None, None) => {
			return Err(ConfigError::Validation(
				"Either --config or --rpc-url (ETH_RPC_URL or ETH_INFURA) must be provided"
					.into(),
			))
		},
	};

	if let Some(url) = rpc_url {
		config.rpc.url = url.to_string();
	}
	config.validate()?;
	Ok(config)
}

/// Formats a recommendation for standard output.
fn render(recommendation: &FeeRecommendation, json: bool) -> Result<String, serde_json::Error> {
	if json {
		return serde_json::to_string_pretty(recommendation);
	}

	Ok(format!(
		"baseFeePerGas (gwei): {}\nmaxPriorityFeePerGas (gwei): {}\nRecommended maxFeePerGas (gwei): {}",
		format_gwei(recommendation.base_fee),
		format_gwei(recommendation.tip),
		format_gwei(recommendation.max_fee),
	))
}

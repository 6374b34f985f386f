//! HTTP JSON-RPC data source built on Alloy.
//!
//! Queries go through the provider's raw RPC client so that the response
//! payloads reach the estimator exactly as the node encoded them.

use crate::{BlockTag, FeeDataSource, RpcError};
use alloy_primitives::U64;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_transport_http::Http;
use async_trait::async_trait;
use fee_config::RpcConfig;
use std::sync::Arc;
use std::time::Duration;

/// Alloy-based node client for fee data.
pub struct AlloyFeeSource {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	/// Endpoint kept for log context.
	url: String,
}

impl AlloyFeeSource {
	/// Creates a new AlloyFeeSource for the configured endpoint.
	///
	/// The underlying HTTP client applies `timeout_seconds` to every request.
	pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
		let url: reqwest::Url = config.url.parse().map_err(|e| {
			RpcError::Configuration(format!("Invalid RPC URL '{}': {}", config.url, e))
		})?;

		let http_client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| RpcError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		let is_local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
		let transport = Http::with_client(http_client, url);
		let client = RpcClient::new(transport, is_local);
		let provider = ProviderBuilder::new().on_client(client);

		Ok(Self {
			provider: Arc::new(provider),
			url: config.url.clone(),
		})
	}

	async fn request<P>(&self, method: &'static str, params: P) -> Result<serde_json::Value, RpcError>
	where
		P: serde::Serialize + Clone + std::fmt::Debug + Send + Sync + Unpin + 'static,
	{
		tracing::trace!(method, url = %self.url, "Sending RPC request");
		self.provider
			.client()
			.request::<P, serde_json::Value>(method, params)
			.await
			.map_err(|e| RpcError::Transport(format!("{} failed: {}", method, e)))
	}
}

#[async_trait]
impl FeeDataSource for AlloyFeeSource {
	async fn fee_history(
		&self,
		block_count: u64,
		newest: BlockTag,
		percentiles: &[f64],
	) -> Result<serde_json::Value, RpcError> {
		let params = (U64::from(block_count), newest.as_str(), percentiles.to_vec());
		let response = self.request("eth_feeHistory", params).await?;
		if !response.is_object() {
			return Err(RpcError::InvalidResponse(format!(
				"eth_feeHistory returned {}",
				response
			)));
		}
		Ok(response)
	}

	async fn max_priority_fee(&self) -> Result<serde_json::Value, RpcError> {
		self.request("eth_maxPriorityFeePerGas", Vec::<serde_json::Value>::new())
			.await
	}

	async fn block(&self, tag: BlockTag) -> Result<serde_json::Value, RpcError> {
		self.request("eth_getBlockByNumber", (tag.as_str(), false)).await
	}
}

/// Factory function to create an HTTP fee data source from configuration.
pub fn create_http_source(config: &RpcConfig) -> Result<Box<dyn FeeDataSource>, RpcError> {
	let source = AlloyFeeSource::new(config)?;
	tracing::debug!(url = %config.url, timeout_seconds = config.timeout_seconds, "Created HTTP fee source");
	Ok(Box::new(source))
}

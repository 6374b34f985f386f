//! Bounded retry with a fixed delay between attempts.
//!
//! Every node query that is allowed to retry goes through
//! [`retry_with_delay`], so attempt counting and sleeping behave the same at
//! every call site.

use fee_config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total number of attempts, at least one.
	pub attempts: u32,
	/// Delay slept after each failed attempt except the last.
	pub delay: Duration,
}

impl RetryPolicy {
	pub fn new(attempts: u32, delay: Duration) -> Self {
		Self {
			attempts: attempts.max(1),
			delay,
		}
	}
}

impl From<&RetryConfig> for RetryPolicy {
	fn from(config: &RetryConfig) -> Self {
		Self::new(config.attempts, Duration::from_millis(config.delay_ms))
	}
}

/// Runs `op` until it succeeds or `policy.attempts` attempts have failed.
///
/// Returns the first success, or the error of the final attempt.
pub async fn retry_with_delay<T, E, F, Fut>(
	policy: &RetryPolicy,
	operation: &str,
	mut op: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let attempts = policy.attempts.max(1);
	let mut attempt = 1;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(e) if attempt < attempts => {
				tracing::warn!(
					operation,
					attempt,
					max_attempts = attempts,
					error = %e,
					"Attempt failed, retrying"
				);
				tokio::time::sleep(policy.delay).await;
				attempt += 1;
			},
			Err(e) => {
				tracing::warn!(
					operation,
					attempts,
					error = %e,
					"All attempts failed"
				);
				return Err(e);
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	#[tokio::test(start_paused = true)]
	async fn test_returns_first_success() {
		let calls = AtomicU32::new(0);
		let counter = &calls;
		let policy = RetryPolicy::new(3, Duration::from_millis(200));
		let start = tokio::time::Instant::now();

		let result: Result<u32, String> = retry_with_delay(&policy, "test", move || async move {
			Ok(counter.fetch_add(1, Ordering::SeqCst))
		})
		.await;

		assert_eq!(result, Ok(0));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn test_retries_until_success() {
		let calls = AtomicU32::new(0);
		let counter = &calls;
		let policy = RetryPolicy::new(5, Duration::from_millis(250));
		let start = tokio::time::Instant::now();

		let result: Result<&str, String> = retry_with_delay(&policy, "test", move || async move {
			let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
			if n < 3 {
				Err(format!("failure {}", n))
			} else {
				Ok("done")
			}
		})
		.await;

		assert_eq!(result, Ok("done"));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
		// Two sleeps between three attempts
		assert_eq!(start.elapsed(), Duration::from_millis(500));
	}

	#[tokio::test(start_paused = true)]
	async fn test_gives_up_after_max_attempts() {
		let calls = AtomicU32::new(0);
		let counter = &calls;
		let policy = RetryPolicy::new(3, Duration::from_millis(200));
		let start = tokio::time::Instant::now();

		let result: Result<(), String> = retry_with_delay(&policy, "test", move || async move {
			let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
			Err(format!("failure {}", n))
		})
		.await;

		assert_eq!(result, Err("failure 3".to_string()));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
		// No sleep after the final attempt
		assert_eq!(start.elapsed(), Duration::from_millis(400));
	}

	#[test]
	fn test_zero_attempts_means_one() {
		let policy = RetryPolicy::from(&RetryConfig {
			attempts: 0,
			delay_ms: 10,
		});
		assert_eq!(policy.attempts, 1);
		assert_eq!(policy.delay, Duration::from_millis(10));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff.

use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
		}
	}
}

impl RetryConfig {
	/// Deterministic doubling backoff: retry `n` (zero-based) waits
	/// `base_delay * 2^n`, for `max_retries` retries after the first attempt.
	pub fn doubling(max_retries: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts: max_retries.saturating_add(1),
			base_delay,
			max_delay: doubling_delay(base_delay, max_retries),
			backoff_factor: 2.0,
			jitter: false,
		}
	}
}

/// `base * 2^exponent`, saturating instead of overflowing.
pub fn doubling_delay(base: Duration, exponent: u32) -> Duration {
	base.saturating_mul(2u32.saturating_pow(exponent))
}

/// Classifies a failure for [`retry`].
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

fn calculate_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
	let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
	let exponential_delay = cfg.base_delay.as_secs_f64() * cfg.backoff_factor.powi(exponent);
	let capped_delay = exponential_delay.min(cfg.max_delay.as_secs_f64());

	let final_delay = if cfg.jitter {
		capped_delay * (0.5 + fastrand::f64())
	} else {
		capped_delay
	};

	Duration::try_from_secs_f64(final_delay).unwrap_or(cfg.max_delay)
}

pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() {
					warn!(error = ?err, attempt, "non-retryable error encountered");
					return Err(err);
				}

				if attempt >= cfg.max_attempts {
					warn!(
						error = ?err,
						attempt,
						max_attempts = cfg.max_attempts,
						"max retry attempts exhausted"
					);
					return Err(err);
				}

				let delay = calculate_delay(cfg, attempt - 1);
				warn!(
					error = ?err,
					attempt,
					max_attempts = cfg.max_attempts,
					delay_ms = delay.as_millis(),
					"retrying after error"
				);

				tokio::time::sleep(delay).await;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};
	use std::sync::Arc;

	#[derive(Debug)]
	struct MockError {
		retryable: bool,
	}

	impl RetryableError for MockError {
		fn is_retryable(&self) -> bool {
			self.retryable
		}
	}

	fn fast_config(max_attempts: u32) -> RetryConfig {
		RetryConfig {
			max_attempts,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(10),
			backoff_factor: 2.0,
			jitter: false,
		}
	}

	#[tokio::test]
	async fn test_non_retryable_error_fails_immediately() {
		let attempts = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&attempts);

		let result: Result<(), MockError> = retry(&RetryConfig::default(), || {
			let count = Arc::clone(&counter);
			async move {
				count.fetch_add(1, Ordering::SeqCst);
				Err(MockError { retryable: false })
			}
		})
		.await;

		assert!(result.is_err());
		assert_eq!(attempts.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_retryable_error_retries_up_to_max_attempts() {
		let attempts = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&attempts);

		let result: Result<(), MockError> = retry(&fast_config(3), || {
			let count = Arc::clone(&counter);
			async move {
				count.fetch_add(1, Ordering::SeqCst);
				Err(MockError { retryable: true })
			}
		})
		.await;

		assert!(result.is_err());
		assert_eq!(attempts.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn test_succeeds_after_retries() {
		let attempts = Arc::new(AtomicU32::new(0));
		let counter = Arc::clone(&attempts);

		let result: Result<&str, MockError> = retry(&fast_config(5), || {
			let count = Arc::clone(&counter);
			async move {
				if count.fetch_add(1, Ordering::SeqCst) < 2 {
					Err(MockError { retryable: true })
				} else {
					Ok("delivered")
				}
			}
		})
		.await;

		assert_eq!(result.unwrap(), "delivered");
		assert_eq!(attempts.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn test_doubling_config_waits_base_times_two_to_the_n() {
		let cfg = RetryConfig::doubling(3, Duration::from_millis(1000));
		assert_eq!(cfg.max_attempts, 4);
		assert_eq!(calculate_delay(&cfg, 0), Duration::from_millis(1000));
		assert_eq!(calculate_delay(&cfg, 1), Duration::from_millis(2000));
		assert_eq!(calculate_delay(&cfg, 2), Duration::from_millis(4000));
	}

	#[test]
	fn test_doubling_delay_saturates() {
		assert_eq!(
			doubling_delay(Duration::from_secs(1), 3),
			Duration::from_secs(8)
		);
		let huge = doubling_delay(Duration::from_secs(u64::MAX / 2), 64);
		assert_eq!(huge, Duration::MAX);
	}

	#[test]
	fn test_jitter_adds_randomness() {
		let with_jitter = RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(100),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
		};

		let delays: Vec<Duration> = (0..10).map(|_| calculate_delay(&with_jitter, 1)).collect();
		assert!(!delays.windows(2).all(|w| w[0] == w[1]));
	}

	#[test]
	fn test_delay_respects_max_delay() {
		let cfg = RetryConfig {
			max_attempts: 10,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(5),
			backoff_factor: 10.0,
			jitter: false,
		};

		for attempt in 0..10 {
			assert!(calculate_delay(&cfg, attempt) <= Duration::from_secs(5));
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry loop with exponential backoff for HTTP requests.
//!
//! The delay after the failure of attempt `i` (0-based) is
//! `base_delay * 2^i`. By default there is no jitter and no cap, so a long
//! sequence of attempts has no aggregate deadline.

use std::time::Duration;
use tracing::warn;

/// Decides whether and how long to wait before re-attempting a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
	/// Total number of transport attempts, including the first one.
	/// Zero is treated as one.
	pub max_attempts: u32,
	/// Delay after the first failed attempt.
	pub base_delay: Duration,
	/// Optional upper bound on a single delay. `None` means uncapped.
	pub max_delay: Option<Duration>,
	/// Scale each delay by a random factor in `[0.5, 1.5)`.
	pub jitter: bool,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(1000),
			max_delay: None,
			jitter: false,
		}
	}
}

impl RetryPolicy {
	/// A policy with the given attempt budget and base delay, no cap and no jitter.
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
			..Self::default()
		}
	}

	/// Effective attempt budget.
	pub fn attempts(&self) -> u32 {
		self.max_attempts.max(1)
	}

	/// Whether another attempt should follow the failure of attempt
	/// `attempt_index` (0-based).
	pub fn should_retry<E: RetryableError + ?Sized>(&self, error: &E, attempt_index: u32) -> bool {
		error.is_retryable() && attempt_index + 1 < self.attempts()
	}

	/// Delay to wait after the failure of attempt `attempt_index` (0-based).
	pub fn delay_for(&self, attempt_index: u32) -> Duration {
		let factor = 2u32.saturating_pow(attempt_index);
		let mut delay = self.base_delay.saturating_mul(factor);

		if let Some(max) = self.max_delay {
			delay = delay.min(max);
		}

		if self.jitter {
			let jitter_factor = 0.5 + fastrand::f64();
			delay = Duration::try_from_secs_f64(delay.as_secs_f64() * jitter_factor).unwrap_or(delay);
		}

		delay
	}
}

/// Errors that know whether the failed operation is worth repeating.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	/// Only failures where no response came back are retryable at this level;
	/// status handling belongs to the caller's classification.
	fn is_retryable(&self) -> bool {
		if self.is_builder() || self.is_body() || self.is_decode() {
			return false;
		}
		self.is_timeout() || self.is_connect() || self.is_request()
	}
}

/// Run `f` until it succeeds, fails with a non-retryable error, or the policy's
/// attempt budget is spent. The error of the last attempt is returned.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Display,
{
	let mut attempt: u32 = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				if !policy.should_retry(&err, attempt) {
					if err.is_retryable() {
						warn!(
							error = %err,
							attempt = attempt + 1,
							max_attempts = policy.attempts(),
							"max retry attempts exhausted"
						);
					}
					return Err(err);
				}

				let delay = policy.delay_for(attempt);
				warn!(
					error = %err,
					attempt = attempt + 1,
					max_attempts = policy.attempts(),
					delay_ms = delay.as_millis() as u64,
					"retrying after error"
				);

				tokio::time::sleep(delay).await;
				attempt += 1;
			}
		}
	}
}

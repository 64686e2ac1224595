// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration and environment loading.

use std::time::Duration;

use a11ops_common_config::{env_flag, env_parse, env_var, load_secret_env, EnvError, SecretString};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.a11ops.com";
pub const DEFAULT_REGION: &str = "auto";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_BREADCRUMBS: usize = 50;

pub const ENV_API_KEY: &str = "A11OPS_API_KEY";
pub const ENV_API_URL: &str = "A11OPS_API_URL";
pub const ENV_REGION: &str = "A11OPS_REGION";
pub const ENV_TIMEOUT_MS: &str = "A11OPS_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "A11OPS_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "A11OPS_RETRY_DELAY_MS";
pub const ENV_ENVIRONMENT: &str = "A11OPS_ENVIRONMENT";
pub const ENV_RELEASE: &str = "A11OPS_RELEASE";
pub const ENV_LOG_MONITORING: &str = "A11OPS_LOG_MONITORING";
pub const ENV_AUTO_CAPTURE_ERRORS: &str = "A11OPS_AUTO_CAPTURE_ERRORS";
pub const ENV_AUTO_BREADCRUMBS: &str = "A11OPS_AUTO_BREADCRUMBS";

/// Errors raised while loading [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(transparent)]
	Env(#[from] EnvError),
}

/// Settings consumed by [`AlertClient`](crate::AlertClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// May be absent; delivery then fails validation before any I/O.
	pub api_key: Option<SecretString>,
	pub base_url: String,
	/// `"auto"` lets the backend route; anything else is sent with each alert.
	pub region: String,
	/// Overall per-request timeout.
	pub timeout: Duration,
	/// Total transport attempts per delivery, including the first.
	pub max_attempts: u32,
	pub retry_delay: Duration,
	pub environment: Option<String>,
	pub release: Option<String>,
	/// Enables the telemetry capture layer.
	pub log_monitoring: bool,
	pub auto_capture_errors: bool,
	pub auto_breadcrumbs: bool,
	pub max_breadcrumbs: usize,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_key: None,
			base_url: DEFAULT_BASE_URL.to_string(),
			region: DEFAULT_REGION.to_string(),
			timeout: DEFAULT_TIMEOUT,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			retry_delay: DEFAULT_RETRY_DELAY,
			environment: None,
			release: None,
			log_monitoring: false,
			auto_capture_errors: true,
			auto_breadcrumbs: true,
			max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
		}
	}
}

impl ClientConfig {
	/// Load configuration from `A11OPS_*` environment variables, falling back
	/// to defaults for anything unset.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut config = Self::default();

		config.api_key = load_secret_env(ENV_API_KEY)?;
		if let Some(url) = env_var(ENV_API_URL) {
			config.base_url = url;
		}
		if let Some(region) = env_var(ENV_REGION) {
			config.region = region;
		}
		if let Some(ms) = env_parse::<u64>(ENV_TIMEOUT_MS)? {
			config.timeout = Duration::from_millis(ms);
		}
		if let Some(attempts) = env_parse::<u32>(ENV_RETRIES)? {
			config.max_attempts = attempts;
		}
		if let Some(ms) = env_parse::<u64>(ENV_RETRY_DELAY_MS)? {
			config.retry_delay = Duration::from_millis(ms);
		}
		config.environment = env_var(ENV_ENVIRONMENT);
		config.release = env_var(ENV_RELEASE);
		if let Some(enabled) = env_flag(ENV_LOG_MONITORING)? {
			config.log_monitoring = enabled;
		}
		if let Some(enabled) = env_flag(ENV_AUTO_CAPTURE_ERRORS)? {
			config.auto_capture_errors = enabled;
		}
		if let Some(enabled) = env_flag(ENV_AUTO_BREADCRUMBS)? {
			config.auto_breadcrumbs = enabled;
		}

		Ok(config)
	}

	/// Whether the host looks like CI or a production deployment.
	pub fn is_production(&self) -> bool {
		std::env::var_os("CI").is_some() || self.environment.as_deref() == Some("production")
	}
}

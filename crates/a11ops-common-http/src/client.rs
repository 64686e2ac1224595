// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with the fixed SDK User-Agent header.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Returns the SDK User-Agent string.
///
/// Format: `a11ops-rust/{version}`
pub fn user_agent() -> String {
	a11ops_common_version::user_agent()
}

/// Headers sent with every request: `Content-Type: application/json`.
pub fn default_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	headers
}

/// Creates a new HTTP client builder with the SDK User-Agent and JSON
/// content type.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = a11ops_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.default_headers(default_headers())
}

/// Creates a blocking client builder with the same defaults.
///
/// Only for contexts where no async runtime can make progress, such as a
/// panic hook.
pub fn blocking_builder() -> reqwest::blocking::ClientBuilder {
	reqwest::blocking::Client::builder()
		.user_agent(user_agent())
		.default_headers(default_headers())
}

/// Creates a new HTTP client with an overall per-request timeout.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert delivery client.

use std::sync::Arc;
use std::time::Duration;

use a11ops_common_config::{SecretString, REDACTED};
use a11ops_common_http::{retry, RetryPolicy};
use a11ops_core::{
	payloads_from_value, AlertPayload, BatchEnvelope, Breadcrumb, MetricsQuery, SlaQuery, Severity,
	UserContext,
};
use chrono::Utc;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::breadcrumbs::BreadcrumbBuffer;
use crate::config::{ClientConfig, ConfigError, DEFAULT_REGION, ENV_API_KEY};
use crate::error::{classify_status, classify_transport, A11opsError, Result};
use crate::instrument::{self, InstrumentationAdapter, Installer};
use crate::platform::Host;
use crate::scope::Scope;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Builder for constructing an [`AlertClient`].
pub struct AlertClientBuilder {
	config: ClientConfig,
	host: Host,
	adapters: Vec<Box<dyn InstrumentationAdapter>>,
}

impl AlertClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self::from_config(ClientConfig::default())
	}

	pub fn from_config(config: ClientConfig) -> Self {
		Self {
			config,
			host: Host::default(),
			adapters: Vec::new(),
		}
	}

	/// Starts from `A11OPS_*` environment variables.
	pub fn from_env() -> std::result::Result<Self, ConfigError> {
		Ok(Self::from_config(ClientConfig::from_env()?))
	}

	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.config.api_key = Some(SecretString::new(key.into()));
		self
	}

	/// Sets the API base URL.
	///
	/// Example: `https://api.a11ops.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.config.base_url = url.into();
		self
	}

	/// Sets the delivery region. `"auto"` leaves routing to the backend.
	pub fn region(mut self, region: impl Into<String>) -> Self {
		self.config.region = region.into();
		self
	}

	/// Sets the overall per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.config.timeout = timeout;
		self
	}

	/// Sets the total number of attempts per delivery. Zero behaves as one.
	pub fn max_attempts(mut self, attempts: u32) -> Self {
		self.config.max_attempts = attempts;
		self
	}

	/// Sets the delay after the first failed attempt; later delays double.
	pub fn retry_delay(mut self, delay: Duration) -> Self {
		self.config.retry_delay = delay;
		self
	}

	/// Sets the environment name.
	///
	/// Example: `production`, `staging`, `development`
	pub fn environment(mut self, env: impl Into<String>) -> Self {
		self.config.environment = Some(env.into());
		self
	}

	/// Sets the release version.
	pub fn release(mut self, release: impl Into<String>) -> Self {
		self.config.release = Some(release.into());
		self
	}

	/// Enables the telemetry capture layer and its instrumentation.
	pub fn log_monitoring(mut self, enabled: bool) -> Self {
		self.config.log_monitoring = enabled;
		self
	}

	pub fn auto_capture_errors(mut self, enabled: bool) -> Self {
		self.config.auto_capture_errors = enabled;
		self
	}

	pub fn auto_breadcrumbs(mut self, enabled: bool) -> Self {
		self.config.auto_breadcrumbs = enabled;
		self
	}

	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.config.max_breadcrumbs = max;
		self
	}

	/// Describes the host the client runs in. Defaults to [`Host::Server`].
	pub fn host(mut self, host: Host) -> Self {
		self.host = host;
		self
	}

	/// Registers an adapter that wires browser hooks into its host.
	pub fn adapter(mut self, adapter: impl InstrumentationAdapter + 'static) -> Self {
		self.adapters.push(Box::new(adapter));
		self
	}

	/// Builds the client and installs instrumentation when log monitoring is
	/// enabled.
	pub fn build(self) -> Result<AlertClient> {
		let mut config = self.config;
		config.base_url = config.base_url.trim_end_matches('/').to_string();

		let http = a11ops_common_http::new_client_with_timeout(config.timeout)
			.map_err(A11opsError::Local)?;
		let retry = RetryPolicy::new(config.max_attempts, config.retry_delay);
		let breadcrumbs = BreadcrumbBuffer::new(config.max_breadcrumbs);

		info!(
			base_url = %config.base_url,
			region = %config.region,
			log_monitoring = config.log_monitoring,
			"a11ops client initialized"
		);

		let client = AlertClient {
			inner: Arc::new(ClientInner {
				config,
				http,
				retry,
				breadcrumbs,
				scope: Scope::new(),
				host: self.host,
				installer: Installer::new(),
			}),
		};

		instrument::install(&client, self.adapters);

		Ok(client)
	}
}

impl Default for AlertClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
pub(crate) struct ClientInner {
	pub(crate) config: ClientConfig,
	http: Client,
	retry: RetryPolicy,
	pub(crate) breadcrumbs: BreadcrumbBuffer,
	pub(crate) scope: Scope,
	pub(crate) host: Host,
	pub(crate) installer: Installer,
}

impl ClientInner {
	/// The API key, or a validation error explaining how to provide one.
	pub(crate) fn api_key(&self) -> Result<&str> {
		match &self.config.api_key {
			Some(key) if !key.expose().is_empty() => Ok(key.expose().as_str()),
			_ => Err(A11opsError::Validation(missing_key_message(
				self.config.is_production(),
			))),
		}
	}

	fn region(&self) -> Option<&str> {
		let region = self.config.region.as_str();
		(region != DEFAULT_REGION).then_some(region)
	}

	/// The base URL extended by `segments`, each percent-encoded as a single
	/// path segment.
	pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
		let invalid =
			|reason: String| A11opsError::Validation(format!("Invalid base URL: {reason}"));

		let mut url = Url::parse(&self.config.base_url).map_err(|e| invalid(e.to_string()))?;
		url.path_segments_mut()
			.map_err(|()| invalid(self.config.base_url.clone()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// One logical request with retry. Returns the parsed body of the first
	/// successful attempt or the error of the last one.
	pub(crate) async fn deliver(
		&self,
		method: Method,
		segments: &[&str],
		query: &[(String, String)],
		body: Option<&Value>,
	) -> Result<Value> {
		let api_key = self.api_key()?;
		let url = self.url(segments)?;
		let url = &url;
		let endpoint = redacted_path(segments, api_key);
		let endpoint = endpoint.as_str();
		let method = &method;

		retry(&self.retry, || {
			self.attempt(method, url, endpoint, query, body, api_key)
		})
		.await
	}

	async fn attempt(
		&self,
		method: &Method,
		url: &Url,
		endpoint: &str,
		query: &[(String, String)],
		body: Option<&Value>,
		api_key: &str,
	) -> Result<Value> {
		debug!(method = %method, endpoint, "sending request");

		let mut request = self
			.http
			.request(method.clone(), url.clone())
			.header(API_KEY_HEADER, api_key);
		if !query.is_empty() {
			request = request.query(query);
		}
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(classify_transport)?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(classify_transport)?;

		if status.is_success() {
			debug!(method = %method, endpoint, status = status.as_u16(), "request succeeded");
			return Ok(parse_body(&bytes));
		}

		let response = (!bytes.is_empty()).then(|| parse_body(&bytes));
		Err(classify_status(status, response))
	}
}

/// Path for logs, with the API key segment replaced.
fn redacted_path(segments: &[&str], api_key: &str) -> String {
	segments
		.iter()
		.map(|segment| if *segment == api_key { REDACTED } else { *segment })
		.fold(String::new(), |mut path, segment| {
			path.push('/');
			path.push_str(segment);
			path
		})
}

/// Empty bodies become `null`; bodies that are not JSON are returned as text.
fn parse_body(bytes: &[u8]) -> Value {
	if bytes.is_empty() {
		return Value::Null;
	}
	serde_json::from_slice(bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn missing_key_message(production: bool) -> String {
	if production {
		format!(
			"{ENV_API_KEY} environment variable is required. \
			 Get your API key from https://a11ops.com/dashboard"
		)
	} else {
		format!(
			"API key is required. Set {ENV_API_KEY} or pass one to \
			 AlertClient::builder().api_key(..)"
		)
	}
}

/// Query-string pairs for the set fields of a filter struct.
fn query_pairs<T: Serialize>(query: &T) -> Result<Vec<(String, String)>> {
	let Value::Object(fields) = serde_json::to_value(query)? else {
		return Ok(Vec::new());
	};
	Ok(fields
		.into_iter()
		.filter_map(|(key, value)| match value {
			Value::Null => None,
			Value::String(s) if s.is_empty() => None,
			Value::String(s) => Some((key, s)),
			other => Some((key, other.to_string())),
		})
		.collect())
}

/// Client for delivering alerts and telemetry to a11ops.
///
/// Cheap to clone; clones share configuration, breadcrumbs and scope.
///
/// # Example
///
/// ```ignore
/// use a11ops::{AlertClient, AlertPayload, Severity};
///
/// let client = AlertClient::builder()
///     .api_key("your_api_key")
///     .build()?;
///
/// client
///     .send_alert(AlertPayload::new("Database down").severity(Severity::Critical))
///     .await?;
/// ```
#[derive(Clone)]
pub struct AlertClient {
	pub(crate) inner: Arc<ClientInner>,
}

impl AlertClient {
	/// Creates a new client builder.
	pub fn builder() -> AlertClientBuilder {
		AlertClientBuilder::new()
	}

	/// Builds a client from `A11OPS_*` environment variables.
	pub fn from_env() -> Result<Self> {
		AlertClientBuilder::from_env()?.build()
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	pub fn host(&self) -> &Host {
		&self.inner.host
	}

	/// Sends one alert to `POST /alerts/{key}`.
	pub async fn send_alert(&self, payload: AlertPayload) -> Result<Value> {
		let mut alert = payload.normalize(Utc::now());
		if let Some(region) = self.inner.region() {
			alert.set_region(region);
		}
		let body = serde_json::to_value(&alert)?;

		let api_key = self.inner.api_key()?;
		self.inner
			.deliver(Method::POST, &["alerts", api_key], &[], Some(&body))
			.await
	}

	/// Sends one alert given as loosely typed JSON.
	pub async fn send_alert_value(&self, payload: Value) -> Result<Value> {
		let payload = AlertPayload::try_from(payload)?;
		self.send_alert(payload).await
	}

	/// Sends a non-empty batch to `POST /alerts/{key}/batch`.
	pub async fn send_batch(&self, alerts: Vec<AlertPayload>) -> Result<Value> {
		let now = Utc::now();
		let normalized = alerts.into_iter().map(|a| a.normalize(now)).collect();
		let mut envelope = BatchEnvelope::new(normalized)?;
		if let Some(region) = self.inner.region() {
			envelope = envelope.with_region(region);
		}
		let body = serde_json::to_value(&envelope)?;

		let api_key = self.inner.api_key()?;
		debug!(count = envelope.len(), "sending alert batch");
		self.inner
			.deliver(Method::POST, &["alerts", api_key, "batch"], &[], Some(&body))
			.await
	}

	/// Sends a batch given as loosely typed JSON. Anything but a non-empty
	/// array is rejected before any network I/O.
	pub async fn send_batch_value(&self, alerts: Value) -> Result<Value> {
		let alerts = payloads_from_value(alerts)?;
		self.send_batch(alerts).await
	}

	/// Fetches delivery metrics from `GET /v1/metrics/delivery`.
	///
	/// The body is returned as sent; convert it with
	/// `DeliveryMetrics::try_from` for a typed view.
	pub async fn get_metrics(&self, query: &MetricsQuery) -> Result<Value> {
		let query = query_pairs(query)?;
		self.inner
			.deliver(Method::GET, &["v1", "metrics", "delivery"], &query, None)
			.await
	}

	/// Fetches SLA compliance from `GET /v1/metrics/sla`. See
	/// `SlaCompliance::try_from` for a typed view.
	pub async fn get_sla_compliance(&self, query: &SlaQuery) -> Result<Value> {
		let query = query_pairs(query)?;
		self.inner
			.deliver(Method::GET, &["v1", "metrics", "sla"], &query, None)
			.await
	}

	pub async fn critical(&self, title: impl Into<String>, message: impl Into<String>) -> Result<Value> {
		self.send_with_severity(Severity::Critical, title.into(), message.into())
			.await
	}

	/// Sends an alert with severity `high`.
	pub async fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Result<Value> {
		self.send_with_severity(Severity::High, title.into(), message.into())
			.await
	}

	/// Sends an alert with severity `medium`.
	pub async fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> Result<Value> {
		self.send_with_severity(Severity::Medium, title.into(), message.into())
			.await
	}

	pub async fn info(&self, title: impl Into<String>, message: impl Into<String>) -> Result<Value> {
		self.send_with_severity(Severity::Info, title.into(), message.into())
			.await
	}

	async fn send_with_severity(
		&self,
		severity: Severity,
		title: String,
		message: String,
	) -> Result<Value> {
		self.send_alert(AlertPayload::new(title).message(message).severity(severity))
			.await
	}

	/// Replaces the user attached to captured events.
	pub fn set_user(&self, user: UserContext) {
		self.inner.scope.set_user(user);
	}

	pub fn set_context(&self, key: impl Into<String>, value: Value) {
		self.inner.scope.set_context(key, value);
	}

	pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
		self.inner.scope.set_tag(key, value);
	}

	/// Adds a breadcrumb to the trail.
	pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		self.inner.breadcrumbs.add(breadcrumb);
	}

	/// Current breadcrumb trail, oldest first.
	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		self.inner.breadcrumbs.snapshot()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use a11ops_core::SlaPeriod;
	use serde_json::json;

	fn offline_client() -> AlertClient {
		AlertClient::builder()
			.api_key("key_test")
			.host(Host::Unknown)
			.build()
			.unwrap()
	}

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let client = AlertClient::builder()
			.base_url("http://localhost:8080/")
			.build()
			.unwrap();
		let url = client.inner.url(&["alerts", "k"]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:8080/alerts/k");
	}

	#[test]
	fn api_key_is_encoded_as_one_segment() {
		let client = AlertClient::builder()
			.base_url("http://localhost:8080/prefix")
			.build()
			.unwrap();
		let url = client.inner.url(&["alerts", "a/b?c#d", "batch"]).unwrap();
		assert_eq!(
			url.as_str(),
			"http://localhost:8080/prefix/alerts/a%2Fb%3Fc%23d/batch"
		);
		assert_eq!(url.path_segments().unwrap().count(), 4);
	}

	#[test]
	fn invalid_base_url_fails_validation() {
		let client = AlertClient::builder().base_url("not a url").build().unwrap();
		let err = client.inner.url(&["alerts"]).unwrap_err();
		assert!(matches!(err, A11opsError::Validation(_)));
	}

	#[test]
	fn logged_path_hides_api_key() {
		assert_eq!(
			redacted_path(&["alerts", "secret", "batch"], "secret"),
			"/alerts/[REDACTED]/batch"
		);
	}

	#[test]
	fn auto_region_is_not_sent() {
		let client = offline_client();
		assert_eq!(client.inner.region(), None);

		let client = AlertClient::builder().region("eu-west-1").build().unwrap();
		assert_eq!(client.inner.region(), Some("eu-west-1"));
	}

	#[test]
	fn missing_key_message_depends_on_host_kind() {
		assert!(missing_key_message(true).starts_with("A11OPS_API_KEY environment variable is required"));
		assert!(missing_key_message(false).starts_with("API key is required"));
	}

	#[tokio::test]
	async fn missing_api_key_fails_validation() {
		let client = AlertClient::builder()
			.base_url("http://127.0.0.1:9")
			.build()
			.unwrap();
		let err = client.info("t", "m").await.unwrap_err();
		assert!(matches!(err, A11opsError::Validation(_)));
	}

	#[tokio::test]
	async fn empty_batch_fails_before_any_request() {
		let client = offline_client();
		let err = client.send_batch(Vec::new()).await.unwrap_err();
		assert_eq!(err.to_string(), "Alerts array is required and must not be empty");

		let err = client.send_batch_value(json!({ "alerts": [] })).await.unwrap_err();
		assert!(matches!(err, A11opsError::Validation(_)));
	}

	#[tokio::test]
	async fn null_payload_fails_validation() {
		let client = offline_client();
		let err = client.send_alert_value(Value::Null).await.unwrap_err();
		assert_eq!(err.to_string(), "Alert payload is required");
	}

	#[test]
	fn query_pairs_skip_unset_filters() {
		let pairs = query_pairs(&SlaQuery::default().period(SlaPeriod::Month)).unwrap();
		assert_eq!(pairs, vec![("period".to_string(), "30d".to_string())]);

		let pairs = query_pairs(&MetricsQuery::default()).unwrap();
		assert!(pairs.is_empty());
	}

	#[test]
	fn parse_body_handles_empty_and_text() {
		assert_eq!(parse_body(b""), Value::Null);
		assert_eq!(parse_body(br#"{"id":"a1"}"#), json!({ "id": "a1" }));
		assert_eq!(parse_body(b"accepted"), json!("accepted"));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry capture: errors, messages and structured logs assembled into
//! [`TelemetryEvent`]s and delivered to the diagnostics endpoint.
//!
//! Capture never fails. Delivery errors are logged and the capture resolves
//! to `None`.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use a11ops_core::{iso_timestamp, Level, TelemetryEvent, UserContext};
use chrono::Utc;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::backtrace::render_error_chain;
use crate::client::{AlertClient, ClientInner, API_KEY_HEADER};
use crate::error::Result;

/// Event type used for plain messages.
pub const MESSAGE_TYPE: &str = "Message";

const PANIC_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Call-site overrides for a single capture.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
	/// Overrides the event `type`.
	pub kind: Option<String>,
	pub level: Option<Level>,
	pub environment: Option<String>,
	pub release: Option<String>,
	/// Replaces the scope user for this event.
	pub user: Option<UserContext>,
	/// Merged over scope tags.
	pub tags: BTreeMap<String, String>,
	/// Merged over scope and platform contexts.
	pub contexts: Map<String, Value>,
	pub extra: Map<String, Value>,
	pub fingerprint: Option<Vec<String>>,
}

impl CaptureOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}

	pub fn level(mut self, level: Level) -> Self {
		self.level = Some(level);
		self
	}

	pub fn environment(mut self, environment: impl Into<String>) -> Self {
		self.environment = Some(environment.into());
		self
	}

	pub fn release(mut self, release: impl Into<String>) -> Self {
		self.release = Some(release.into());
		self
	}

	pub fn user(mut self, user: UserContext) -> Self {
		self.user = Some(user);
		self
	}

	pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn context(mut self, key: impl Into<String>, value: Value) -> Self {
		self.contexts.insert(key.into(), value);
		self
	}

	pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	pub fn fingerprint(mut self, parts: Vec<String>) -> Self {
		self.fingerprint = Some(parts);
		self
	}
}

/// Input accepted by [`AlertClient::capture_log`].
#[derive(Debug)]
pub enum LogInput {
	Text(String),
	Error(Box<dyn std::error::Error + Send + Sync>),
	/// A JSON object. Its `message` and `level` fields are honoured and all
	/// of its fields land in `extra`.
	Structured(Map<String, Value>),
}

impl From<&str> for LogInput {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for LogInput {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Map<String, Value>> for LogInput {
	fn from(fields: Map<String, Value>) -> Self {
		Self::Structured(fields)
	}
}

impl From<Value> for LogInput {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(fields) => Self::Structured(fields),
			Value::String(text) => Self::Text(text),
			other => Self::Text(other.to_string()),
		}
	}
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogInput {
	fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
		Self::Error(err)
	}
}

/// What went wrong, before scope and options are applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Report {
	pub kind: String,
	pub message: String,
	pub stack_trace: String,
}

impl Report {
	pub(crate) fn from_error(kind: String, error: &(dyn std::error::Error + 'static)) -> Self {
		Self {
			stack_trace: render_error_chain(&kind, error),
			message: error.to_string(),
			kind,
		}
	}

	pub(crate) fn message(message: String) -> Self {
		Self {
			kind: MESSAGE_TYPE.to_string(),
			message,
			stack_trace: String::new(),
		}
	}
}

/// Last path segment of a type name, without generics.
///
/// `my_app::db::QueryError` becomes `QueryError`; trait objects become
/// `Error`.
pub(crate) fn short_type_name(full: &str) -> String {
	if full.starts_with("dyn ") {
		return "Error".to_string();
	}
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base).to_string()
}

impl ClientInner {
	/// Assembles an event. Breadcrumbs and scope are copied here, so the event
	/// reflects the state at the moment of capture.
	pub(crate) fn build_event(
		&self,
		report: Report,
		default_level: Level,
		options: CaptureOptions,
	) -> TelemetryEvent {
		let breadcrumbs = self.breadcrumbs.snapshot();

		let mut contexts = self.scope.context();
		contexts.extend(self.host.collect_contexts());
		contexts.extend(options.contexts);

		let mut tags = self.scope.tags();
		tags.extend(options.tags);

		TelemetryEvent {
			kind: options.kind.unwrap_or(report.kind),
			message: report.message,
			stack_trace: report.stack_trace,
			level: options.level.unwrap_or(default_level),
			platform: self.host.platform(),
			environment: options
				.environment
				.or_else(|| self.config.environment.clone())
				.unwrap_or_else(|| "production".to_string()),
			release: options.release.or_else(|| self.config.release.clone()),
			timestamp: iso_timestamp(Utc::now()),
			contexts,
			user: options.user.unwrap_or_else(|| self.scope.user()),
			tags,
			breadcrumbs,
			extra: options.extra,
			fingerprint: options.fingerprint,
			request: self.host.request_context(),
		}
	}

	pub(crate) async fn send_event(&self, event: TelemetryEvent) -> Option<Value> {
		match self.try_send_event(&event).await {
			Ok(response) => Some(response),
			Err(e) => {
				warn!(error = %e, event_type = %event.kind, "failed to deliver telemetry event");
				None
			}
		}
	}

	async fn try_send_event(&self, event: &TelemetryEvent) -> Result<Value> {
		let body = serde_json::to_value(event)?;
		let api_key = self.api_key()?;
		self.deliver(Method::POST, &["api", "logs", api_key], &[], Some(&body))
			.await
	}

	/// Single blocking attempt, for contexts where no async work can complete.
	pub(crate) fn send_event_blocking(&self, event: &TelemetryEvent) {
		let api_key = match self.api_key() {
			Ok(key) => key,
			Err(e) => {
				error!(error = %e, "cannot report event");
				return;
			}
		};

		let url = match self.url(&["api", "logs", api_key]) {
			Ok(url) => url,
			Err(e) => {
				error!(error = %e, "cannot report event");
				return;
			}
		};

		let client = match a11ops_common_http::blocking_builder()
			.timeout(PANIC_REPORT_TIMEOUT)
			.build()
		{
			Ok(client) => client,
			Err(e) => {
				error!(error = %e, "failed to build blocking HTTP client");
				return;
			}
		};

		let result = client
			.post(url)
			.header(API_KEY_HEADER, api_key)
			.json(event)
			.send();

		match result {
			Ok(response) if response.status().is_success() => {}
			Ok(response) => {
				error!(status = response.status().as_u16(), "failed to report event");
			}
			Err(e) => error!(error = %e, "failed to report event"),
		}
	}
}

impl AlertClient {
	/// Captures an error at level `error`.
	///
	/// The event is assembled before this returns; the returned future only
	/// delivers it. It resolves to the backend response, or `None` when log
	/// monitoring is disabled or delivery failed.
	pub fn capture_error<E>(
		&self,
		error: &E,
		options: CaptureOptions,
	) -> impl Future<Output = Option<Value>> + Send + 'static
	where
		E: std::error::Error + 'static,
	{
		let kind = short_type_name(std::any::type_name::<E>());
		self.capture_report(Report::from_error(kind, error), Level::Error, options)
	}

	/// Captures a plain message at `level` unless `options.level` overrides it.
	pub fn capture_message(
		&self,
		message: impl Into<String>,
		level: Level,
		options: CaptureOptions,
	) -> impl Future<Output = Option<Value>> + Send + 'static {
		self.capture_report(Report::message(message.into()), level, options)
	}

	/// Captures text, an error, or a structured object.
	pub fn capture_log(
		&self,
		log: impl Into<LogInput>,
		mut options: CaptureOptions,
	) -> impl Future<Output = Option<Value>> + Send + 'static {
		match log.into() {
			LogInput::Text(text) => {
				let level = options.level.take().unwrap_or(Level::Info);
				self.capture_report(Report::message(text), level, options)
			}
			LogInput::Error(err) => {
				let report = Report::from_error("Error".to_string(), &*err);
				self.capture_report(report, Level::Error, options)
			}
			LogInput::Structured(fields) => {
				let message = fields
					.get("message")
					.and_then(Value::as_str)
					.filter(|m| !m.is_empty())
					.map(str::to_string)
					.unwrap_or_else(|| Value::Object(fields.clone()).to_string());
				let level = fields
					.get("level")
					.and_then(Value::as_str)
					.and_then(|l| l.parse::<Level>().ok())
					.or(options.level.take())
					.unwrap_or(Level::Info);

				let mut extra = fields;
				extra.extend(std::mem::take(&mut options.extra));
				options.extra = extra;

				self.capture_report(Report::message(message), level, options)
			}
		}
	}

	pub(crate) fn capture_report(
		&self,
		report: Report,
		default_level: Level,
		options: CaptureOptions,
	) -> impl Future<Output = Option<Value>> + Send + 'static {
		let event = self
			.inner
			.config
			.log_monitoring
			.then(|| self.inner.build_event(report, default_level, options));
		let client = self.clone();

		async move {
			match event {
				Some(event) => client.inner.send_event(event).await,
				None => None,
			}
		}
	}
}

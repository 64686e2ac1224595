// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hooks a browser-like host calls from its global listeners and wrapped
//! APIs.
//!
//! Every wrapper records telemetry and then runs the host's original
//! behaviour, returning its result unchanged.

use std::fmt;
use std::future::Future;
use std::sync::Weak;
use std::time::Instant;

use a11ops_core::{Breadcrumb, BreadcrumbLevel};
use serde_json::{Map, Value};
use tracing::warn;

use crate::client::{AlertClient, ClientInner};
use crate::telemetry::{CaptureOptions, Report};

/// Event type of captured unhandled promise rejections.
pub const UNHANDLED_PROMISE_REJECTION: &str = "UnhandledPromiseRejection";

/// Tags whose clicks are recorded.
const CLICKABLE_TAGS: &[&str] = &["button", "a", "input"];

/// An error thrown by host script code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptError {
	/// e.g. "TypeError"
	pub name: String,
	pub message: String,
	pub stack: Option<String>,
}

impl ScriptError {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			stack: None,
		}
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	fn into_report(self) -> Report {
		let kind = if self.name.is_empty() {
			"Error".to_string()
		} else {
			self.name
		};
		Report {
			kind,
			message: self.message,
			stack_trace: self.stack.unwrap_or_default(),
		}
	}
}

/// Payload of the host's global `error` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
	pub message: String,
	pub error: Option<ScriptError>,
	pub filename: Option<String>,
	pub lineno: Option<u32>,
	pub colno: Option<u32>,
}

/// Reason an unhandled rejection carried.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
	Error(ScriptError),
	/// Any non-error value. Its text becomes the event message.
	Value(Value),
}

/// Element a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
	pub tag_name: String,
	pub text_content: Option<String>,
	pub value: Option<String>,
	pub id: Option<String>,
	pub class_name: Option<String>,
}

impl ClickTarget {
	pub fn new(tag_name: impl Into<String>) -> Self {
		Self {
			tag_name: tag_name.into(),
			..Self::default()
		}
	}

	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text_content = Some(text.into());
		self
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// First non-empty of text content, value, id and class name.
	fn label(&self) -> Option<&str> {
		[&self.text_content, &self.value, &self.id, &self.class_name]
			.into_iter()
			.flatten()
			.map(String::as_str)
			.find(|s| !s.is_empty())
	}
}

/// Responses whose status a fetch breadcrumb can record.
pub trait ResponseStatus {
	fn status_code(&self) -> u16;
}

impl ResponseStatus for reqwest::Response {
	fn status_code(&self) -> u16 {
		self.status().as_u16()
	}
}

impl ResponseStatus for u16 {
	fn status_code(&self) -> u16 {
		*self
	}
}

/// Handle given to [`InstrumentationAdapter`](super::InstrumentationAdapter)s.
///
/// Holds the client weakly; once the client is dropped every hook is a plain
/// pass-through.
#[derive(Clone)]
pub struct BrowserHooks {
	client: Weak<ClientInner>,
}

impl fmt::Debug for BrowserHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrowserHooks")
			.field("attached", &(self.client.strong_count() > 0))
			.finish()
	}
}

impl BrowserHooks {
	pub(crate) fn new(client: Weak<ClientInner>) -> Self {
		Self { client }
	}

	fn client(&self) -> Option<AlertClient> {
		self.client.upgrade().map(|inner| AlertClient { inner })
	}

	fn capturing_client(&self) -> Option<AlertClient> {
		self.client()
			.filter(|c| c.inner.config.auto_capture_errors)
	}

	fn recording_client(&self) -> Option<AlertClient> {
		self.client().filter(|c| c.inner.config.auto_breadcrumbs)
	}

	fn record(&self, breadcrumb: Breadcrumb) {
		if let Some(client) = self.recording_client() {
			client.add_breadcrumb(breadcrumb);
		}
	}

	/// Global `error` listener.
	pub fn on_error(&self, event: ErrorEvent) {
		let Some(client) = self.capturing_client() else {
			return;
		};

		let report = match event.error {
			Some(error) => error.into_report(),
			None => Report {
				kind: "Error".to_string(),
				message: event.message,
				stack_trace: String::new(),
			},
		};
		let mut options = CaptureOptions::new();
		if let Some(filename) = event.filename {
			options = options.extra("filename", filename);
		}
		if let Some(lineno) = event.lineno {
			options = options.extra("lineno", lineno);
		}
		if let Some(colno) = event.colno {
			options = options.extra("colno", colno);
		}

		spawn_detached(client.capture_report(report, a11ops_core::Level::Error, options));
	}

	/// Global `unhandledrejection` listener.
	pub fn on_unhandled_rejection(&self, reason: RejectionReason) {
		let Some(client) = self.capturing_client() else {
			return;
		};

		let report = match reason {
			RejectionReason::Error(error) => error.into_report(),
			RejectionReason::Value(value) => Report {
				kind: "Error".to_string(),
				message: value_text(&value),
				stack_trace: String::new(),
			},
		};
		let options = CaptureOptions::new().kind(UNHANDLED_PROMISE_REJECTION);
		spawn_detached(client.capture_report(report, a11ops_core::Level::Error, options));
	}

	/// Wraps a console method call.
	pub fn console<R>(&self, method: &str, args: &[Value], original: impl FnOnce() -> R) -> R {
		let level = method.parse().unwrap_or(BreadcrumbLevel::Info);
		let message = args.iter().map(value_text).collect::<Vec<_>>().join(" ");
		self.record(
			Breadcrumb::new("console", "console")
				.with_level(level)
				.with_message(message),
		);
		original()
	}

	/// Wraps a `fetch` call, recording method, URL, status and duration.
	pub async fn fetch<Fut, T, E>(&self, method: &str, url: &str, original: Fut) -> Result<T, E>
	where
		Fut: Future<Output = Result<T, E>>,
		T: ResponseStatus,
		E: fmt::Display,
	{
		let started = Instant::now();
		let result = original.await;

		let method = if method.is_empty() { "GET" } else { method };
		let mut crumb = Breadcrumb::new("http", "fetch")
			.with_data("url", url)
			.with_data("method", method);
		match &result {
			Ok(response) => crumb = crumb.with_data("status_code", response.status_code()),
			Err(e) => {
				crumb = crumb
					.with_level(BreadcrumbLevel::Error)
					.with_data("error", e.to_string())
			}
		}
		self.record(crumb.with_data("duration", elapsed_ms(started)));

		result
	}

	/// Call when an XHR is opened; finish the span on `loadend`.
	pub fn xhr_open(&self, method: impl Into<String>, url: impl Into<String>) -> XhrSpan {
		XhrSpan {
			hooks: self.clone(),
			method: method.into(),
			url: url.into(),
			started: Instant::now(),
		}
	}

	/// Wraps `history.pushState`.
	pub fn push_state<R>(&self, from: &str, to: Option<&str>, original: impl FnOnce() -> R) -> R {
		self.record_navigation(Some(from), to);
		original()
	}

	/// Wraps `history.replaceState`.
	pub fn replace_state<R>(
		&self,
		from: &str,
		to: Option<&str>,
		original: impl FnOnce() -> R,
	) -> R {
		self.record_navigation(Some(from), to);
		original()
	}

	/// `popstate` listener; `location` is the location after the change.
	pub fn on_popstate(&self, location: &str) {
		self.record_navigation(None, Some(location));
	}

	fn record_navigation(&self, from: Option<&str>, to: Option<&str>) {
		let mut data = Map::new();
		if let Some(from) = from {
			data.insert("from".to_string(), Value::from(from));
		}
		data.insert(
			"to".to_string(),
			to.map(Value::from).unwrap_or(Value::Null),
		);
		let mut crumb = Breadcrumb::new("navigation", "navigation");
		crumb.data = data;
		self.record(crumb);
	}

	/// Capture-phase `click` listener. Only buttons, links and inputs are
	/// recorded.
	pub fn on_click(&self, target: &ClickTarget) {
		let tag_name = target.tag_name.to_ascii_lowercase();
		if !CLICKABLE_TAGS.contains(&tag_name.as_str()) {
			return;
		}

		self.record(
			Breadcrumb::new("user", "click")
				.with_data("tagName", tag_name.as_str())
				.with_data("text", target.label().map(Value::from).unwrap_or(Value::Null))
				.with_data("id", target.id.clone().map(Value::from).unwrap_or(Value::Null))
				.with_data(
					"className",
					target
						.class_name
						.clone()
						.map(Value::from)
						.unwrap_or(Value::Null),
				),
		);
	}

	#[cfg(test)]
	pub(crate) fn for_client(client: &AlertClient) -> Self {
		Self::new(std::sync::Arc::downgrade(&client.inner))
	}
}

/// An XHR between `open` and `loadend`.
#[derive(Debug)]
pub struct XhrSpan {
	hooks: BrowserHooks,
	method: String,
	url: String,
	started: Instant,
}

impl XhrSpan {
	/// Records the completed request.
	pub fn finish(self, status_code: u16) {
		let crumb = Breadcrumb::new("http", "xhr")
			.with_data("method", self.method)
			.with_data("url", self.url)
			.with_data("status_code", status_code)
			.with_data("duration", elapsed_ms(self.started));
		self.hooks.record(crumb);
	}
}

fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Strings verbatim, everything else as JSON.
fn value_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Runs a capture off the caller's control flow.
pub(crate) fn spawn_detached<F>(future: F)
where
	F: Future<Output = Option<Value>> + Send + 'static,
{
	match tokio::runtime::Handle::try_current() {
		Ok(handle) => {
			handle.spawn(future);
		}
		Err(_) => warn!("no tokio runtime available, dropping captured event"),
	}
}

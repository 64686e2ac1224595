// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing layer that records log events as console breadcrumbs.

use std::fmt;
use std::sync::Weak;

use a11ops_core::{Breadcrumb, BreadcrumbLevel};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::client::{AlertClient, ClientInner};

/// Crates of the SDK itself. Their events are never recorded.
const OWN_CRATES: &[&str] = &[
	"a11ops",
	"a11ops_common_config",
	"a11ops_common_http",
	"a11ops_common_version",
	"a11ops_core",
];

fn is_own_target(target: &str) -> bool {
	OWN_CRATES.iter().any(|krate| {
		target
			.strip_prefix(krate)
			.is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
	})
}

/// A tracing [`Layer`] that adds a `console` breadcrumb for every event.
///
/// Compose it with other layers; events pass through to them untouched.
/// Recording happens only while the client is alive and has log monitoring
/// and auto breadcrumbs enabled.
#[derive(Clone)]
pub struct BreadcrumbLayer {
	client: Weak<ClientInner>,
}

impl BreadcrumbLayer {
	pub(crate) fn new(client: &AlertClient) -> Self {
		Self {
			client: std::sync::Arc::downgrade(&client.inner),
		}
	}
}

impl<S> Layer<S> for BreadcrumbLayer
where
	S: Subscriber,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		if is_own_target(metadata.target()) {
			return;
		}
		let Some(inner) = self.client.upgrade() else {
			return;
		};
		if !(inner.config.log_monitoring && inner.config.auto_breadcrumbs) {
			return;
		}

		let mut visitor = FieldVisitor::default();
		event.record(&mut visitor);

		let mut crumb = Breadcrumb::new("console", "console")
			.with_level(breadcrumb_level(metadata.level()))
			.with_data("target", metadata.target());
		crumb.data.extend(visitor.fields);
		if let Some(message) = visitor.message {
			crumb = crumb.with_message(message);
		}

		inner.breadcrumbs.add(crumb);
	}
}

fn breadcrumb_level(level: &Level) -> BreadcrumbLevel {
	match *level {
		Level::TRACE | Level::DEBUG => BreadcrumbLevel::Debug,
		Level::INFO => BreadcrumbLevel::Info,
		Level::WARN => BreadcrumbLevel::Warning,
		Level::ERROR => BreadcrumbLevel::Error,
	}
}

/// Visitor that extracts the message and fields from a tracing event.
#[derive(Default)]
struct FieldVisitor {
	message: Option<String>,
	fields: Map<String, Value>,
}

impl Visit for FieldVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		let value = format!("{value:?}");
		if field.name() == "message" {
			self.message = Some(value);
		} else {
			self.fields.insert(field.name().to_string(), Value::String(value));
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = Some(value.to_string());
		} else {
			self.fields.insert(field.name().to_string(), Value::from(value));
		}
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		self.fields.insert(field.name().to_string(), Value::from(value));
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		self.fields.insert(field.name().to_string(), Value::from(value));
	}

	fn record_bool(&mut self, field: &Field, value: bool) {
		self.fields.insert(field.name().to_string(), Value::from(value));
	}

	fn record_f64(&mut self, field: &Field, value: f64) {
		self.fields.insert(field.name().to_string(), Value::from(value));
	}

	fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
		self.fields
			.insert(field.name().to_string(), Value::String(value.to_string()));
	}
}

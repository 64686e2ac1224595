// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert payloads, normalization and the batch envelope.
//!
//! Callers hand in an [`AlertPayload`]: a handful of well-known fields plus
//! any number of free-form fields. Before transmission the payload is
//! normalized into a [`NormalizedAlert`]:
//!
//! - `title` defaults to `"Alert"`
//! - `message` defaults to the legacy `body` field, then to `""`
//! - `severity` defaults to the legacy `priority` field, then to `info`
//! - `timestamp` defaults to the send time
//! - free-form fields are merged over the defaults, caller wins
//! - `priority`, `body` and `workspace` are never transmitted

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::iso_timestamp;

/// Fields removed from every payload before transmission. `workspace` is
/// implied by the API key.
const STRIPPED_FIELDS: [&str; 3] = ["priority", "body", "workspace"];

/// Severity of an alert.
///
/// Unknown severities are carried through unvalidated in [`Severity::Other`];
/// the backend is the authority on what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Severity {
	Critical,
	High,
	Medium,
	Low,
	#[default]
	Info,
	Other(String),
}

impl Severity {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Critical => "critical",
			Self::High => "high",
			Self::Medium => "medium",
			Self::Low => "low",
			Self::Info => "info",
			Self::Other(s) => s,
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Severity {
	type Err = Infallible;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(match s {
			"critical" => Self::Critical,
			"high" => Self::High,
			"medium" => Self::Medium,
			"low" => Self::Low,
			"info" => Self::Info,
			other => Self::Other(other.to_string()),
		})
	}
}

impl From<&str> for Severity {
	fn from(s: &str) -> Self {
		match s.parse() {
			Ok(severity) => severity,
			Err(never) => match never {},
		}
	}
}

impl Serialize for Severity {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for Severity {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Severity::from(raw.as_str()))
	}
}

/// An alert as supplied by the caller.
///
/// # Example
///
/// ```
/// use a11ops_core::{AlertPayload, Severity};
///
/// let payload = AlertPayload::new("Disk almost full")
///     .message("/var is at 97%")
///     .severity(Severity::High)
///     .field("host", "db-01");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct AlertPayload {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub severity: Option<Severity>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<String>,
	/// Free-form caller fields, merged over the defaults. Well-known fields
	/// whose value is not a string are kept here verbatim.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl AlertPayload {
	/// A payload with a title and everything else defaulted.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: Some(title.into()),
			..Self::default()
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn severity(mut self, severity: impl Into<Severity>) -> Self {
		self.severity = Some(severity.into());
		self
	}

	pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
		self.timestamp = Some(timestamp.into());
		self
	}

	/// Adds a free-form field.
	pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(key.into(), value.into());
		self
	}

	/// Applies the defaults and strips the legacy fields.
	pub fn normalize(self, now: DateTime<Utc>) -> NormalizedAlert {
		let mut fields = self.fields;
		let body = fields.remove("body");
		let priority = fields.remove("priority");
		for key in STRIPPED_FIELDS {
			fields.remove(key);
		}

		let message = self
			.message
			.or_else(|| body.as_ref().and_then(value_as_text))
			.unwrap_or_default();
		let severity = self
			.severity
			.or_else(|| {
				priority
					.as_ref()
					.and_then(value_as_text)
					.map(|p| Severity::from(p.as_str()))
			})
			.unwrap_or_default();

		let mut out = Map::new();
		out.insert(
			"title".to_string(),
			Value::String(self.title.unwrap_or_else(|| "Alert".to_string())),
		);
		out.insert("message".to_string(), Value::String(message));
		out.insert(
			"severity".to_string(),
			Value::String(severity.as_str().to_string()),
		);
		out.insert(
			"timestamp".to_string(),
			Value::String(self.timestamp.unwrap_or_else(|| iso_timestamp(now))),
		);
		out.extend(fields);

		NormalizedAlert(out)
	}
}

impl From<Map<String, Value>> for AlertPayload {
	/// Lifts string-valued well-known fields into their typed slots. `null`
	/// counts as absent; any other value stays in `fields` and is sent as is.
	fn from(mut fields: Map<String, Value>) -> Self {
		let mut take = |key: &str| match fields.remove(key) {
			Some(Value::String(s)) => Some(s),
			Some(Value::Null) | None => None,
			Some(other) => {
				fields.insert(key.to_string(), other);
				None
			}
		};
		let title = take("title");
		let message = take("message");
		let severity = take("severity").map(|s| Severity::from(s.as_str()));
		let timestamp = take("timestamp");

		Self {
			title,
			message,
			severity,
			timestamp,
			fields,
		}
	}
}

impl TryFrom<Value> for AlertPayload {
	type Error = CoreError;

	/// Builds a payload from loosely typed JSON. `null` counts as an absent
	/// payload.
	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Null => Err(CoreError::Validation(
				"Alert payload is required".to_string(),
			)),
			Value::Object(fields) => Ok(Self::from(fields)),
			_ => Err(CoreError::Validation(
				"Alert payload must be an object".to_string(),
			)),
		}
	}
}

/// Splits loosely typed JSON into batch payloads. Anything but a non-empty
/// array is rejected.
pub fn payloads_from_value(value: Value) -> Result<Vec<AlertPayload>> {
	match value {
		Value::Array(items) if !items.is_empty() => {
			items.into_iter().map(AlertPayload::try_from).collect()
		}
		_ => Err(empty_batch_error()),
	}
}

fn empty_batch_error() -> CoreError {
	CoreError::Validation("Alerts array is required and must not be empty".to_string())
}

fn value_as_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

/// An alert after normalization, exactly as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAlert(Map<String, Value>);

impl NormalizedAlert {
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn title(&self) -> Option<&str> {
		self.0.get("title").and_then(Value::as_str)
	}

	pub fn message(&self) -> Option<&str> {
		self.0.get("message").and_then(Value::as_str)
	}

	pub fn severity(&self) -> Option<&str> {
		self.0.get("severity").and_then(Value::as_str)
	}

	/// Sets the delivery region. Callers skip this for the `auto` region.
	pub fn set_region(&mut self, region: impl Into<String>) {
		self.0.insert("region".to_string(), Value::String(region.into()));
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}

/// A non-empty ordered batch of normalized alerts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEnvelope {
	alerts: Vec<NormalizedAlert>,
	#[serde(skip_serializing_if = "Option::is_none")]
	region: Option<String>,
}

impl BatchEnvelope {
	pub fn new(alerts: Vec<NormalizedAlert>) -> Result<Self> {
		if alerts.is_empty() {
			return Err(empty_batch_error());
		}
		Ok(Self {
			alerts,
			region: None,
		})
	}

	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());
		self
	}

	pub fn alerts(&self) -> &[NormalizedAlert] {
		&self.alerts
	}

	pub fn region(&self) -> Option<&str> {
		self.region.as_deref()
	}

	pub fn len(&self) -> usize {
		self.alerts.len()
	}

	/// Always false; kept for clippy's `len_without_is_empty`.
	pub fn is_empty(&self) -> bool {
		self.alerts.is_empty()
	}
}

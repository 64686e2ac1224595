// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry event sent to the diagnostics endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::breadcrumb::{Breadcrumb, BreadcrumbLevel};
use crate::context::{RequestContext, UserContext};
use crate::error::CoreError;

/// Severity level of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
	Debug,
	Info,
	Warning,
	Error,
	Fatal,
}

impl Level {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Error => "error",
			Self::Fatal => "fatal",
		}
	}
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Level {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			"fatal" => Ok(Self::Fatal),
			_ => Err(CoreError::InvalidLevel(s.to_string())),
		}
	}
}

impl From<Level> for BreadcrumbLevel {
	fn from(level: Level) -> Self {
		match level {
			Level::Debug => Self::Debug,
			Level::Info => Self::Info,
			Level::Warning => Self::Warning,
			Level::Error | Level::Fatal => Self::Error,
		}
	}
}

/// Host family the event was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
	Browser,
	/// Native process. Reported under the backend's historical name.
	#[serde(rename = "node")]
	Server,
	Unknown,
}

impl Platform {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Browser => "browser",
			Self::Server => "node",
			Self::Unknown => "unknown",
		}
	}
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A normalized diagnostic record.
///
/// `contexts` and `tags` hold the union of scope state and freshly collected
/// values; `breadcrumbs` is a snapshot taken at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
	/// Short error type name, `"Message"` for messages, or a caller override.
	#[serde(rename = "type")]
	pub kind: String,
	pub message: String,
	#[serde(default)]
	pub stack_trace: String,
	pub level: Level,
	pub platform: Platform,
	pub environment: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub release: Option<String>,
	/// ISO-8601 UTC with millisecond precision.
	pub timestamp: String,
	#[serde(default)]
	pub contexts: Map<String, Value>,
	#[serde(default)]
	pub user: UserContext,
	#[serde(default)]
	pub tags: BTreeMap<String, String>,
	#[serde(default)]
	pub breadcrumbs: Vec<Breadcrumb>,
	#[serde(default)]
	pub extra: Map<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fingerprint: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request: Option<RequestContext>,
}

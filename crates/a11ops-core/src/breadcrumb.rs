// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types (contextual events leading up to a captured error).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A timestamped contextual event: a click, a navigation, an HTTP call, a
/// console line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breadcrumb {
	/// Epoch milliseconds. Stamped on insertion when absent.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<i64>,
	/// "console", "http", "navigation", "user"
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// "console", "xhr", "fetch", "navigation", "click"
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub level: Option<BreadcrumbLevel>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Map::is_empty")]
	pub data: Map<String, Value>,
}

impl Breadcrumb {
	pub fn new(kind: impl Into<String>, category: impl Into<String>) -> Self {
		Self {
			kind: Some(kind.into()),
			category: Some(category.into()),
			..Self::default()
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_level(mut self, level: BreadcrumbLevel) -> Self {
		self.level = Some(level);
		self
	}

	pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.insert(key.into(), value.into());
		self
	}

	pub fn with_timestamp(mut self, epoch_millis: i64) -> Self {
		self.timestamp = Some(epoch_millis);
		self
	}
}

/// Severity level of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbLevel {
	Debug,
	Info,
	Warning,
	Error,
}

impl fmt::Display for BreadcrumbLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for BreadcrumbLevel {
	type Err = CoreError;

	/// Accepts the level names plus the console method names `log` and
	/// `warn`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" | "trace" => Ok(Self::Debug),
			"info" | "log" => Ok(Self::Info),
			"warning" | "warn" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidBreadcrumbLevel(s.to_string())),
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query filters and response shapes of the read-only metrics endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Filters for `GET /v1/metrics/delivery`. Unset filters are omitted from
/// the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workspace_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_date: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_date: Option<String>,
}

impl MetricsQuery {
	pub fn workspace(mut self, id: impl Into<String>) -> Self {
		self.workspace_id = Some(id.into());
		self
	}

	pub fn region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());
		self
	}

	pub fn between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
		self.start_date = Some(start.into());
		self.end_date = Some(end.into());
		self
	}
}

/// Reporting window for SLA compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaPeriod {
	#[serde(rename = "24h")]
	Day,
	#[serde(rename = "7d")]
	Week,
	#[serde(rename = "30d")]
	Month,
}

impl fmt::Display for SlaPeriod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Day => write!(f, "24h"),
			Self::Week => write!(f, "7d"),
			Self::Month => write!(f, "30d"),
		}
	}
}

/// Filters for `GET /v1/metrics/sla`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaQuery {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workspace_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub period: Option<SlaPeriod>,
}

impl SlaQuery {
	pub fn workspace(mut self, id: impl Into<String>) -> Self {
		self.workspace_id = Some(id.into());
		self
	}

	pub fn period(mut self, period: SlaPeriod) -> Self {
		self.period = Some(period);
		self
	}
}

/// Typed view of a delivery metrics response.
///
/// Every figure is optional since the backend reports `null` for empty
/// windows. Fields this struct does not know land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeliveryMetrics {
	pub total: Option<u64>,
	pub delivered: Option<u64>,
	pub failed: Option<u64>,
	pub pending: Option<u64>,
	pub avg_latency: Option<f64>,
	pub p99_latency: Option<f64>,
	pub p95_latency: Option<f64>,
	pub by_region: Option<BTreeMap<String, RegionMetrics>>,
	pub raw: Option<Vec<Value>>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionMetrics {
	pub total: Option<u64>,
	pub delivered: Option<u64>,
	pub failed: Option<u64>,
	pub avg_latency: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Typed view of an SLA compliance response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaCompliance {
	pub period: Option<String>,
	pub compliance: Option<Vec<WorkspaceCompliance>>,
	pub summary: Option<SlaSummary>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Per-workspace SLA figures. The backend reports these in snake_case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceCompliance {
	pub workspace_id: Option<String>,
	pub workspace_name: Option<String>,
	pub total_alerts: Option<u64>,
	pub delivered_alerts: Option<u64>,
	pub delivery_rate: Option<f64>,
	pub avg_latency_ms: Option<f64>,
	pub p99_latency_compliance: Option<f64>,
	pub uptime_compliance: Option<f64>,
	pub sla_met: Option<bool>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaSummary {
	pub total_workspaces: Option<u64>,
	pub meeting_sla: Option<u64>,
	pub overall_delivery_rate: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl TryFrom<Value> for DeliveryMetrics {
	type Error = serde_json::Error;

	/// Reads a response body returned by the delivery metrics endpoint.
	/// `null` yields an empty view.
	fn try_from(body: Value) -> std::result::Result<Self, Self::Error> {
		from_body(body)
	}
}

impl TryFrom<Value> for SlaCompliance {
	type Error = serde_json::Error;

	fn try_from(body: Value) -> std::result::Result<Self, Self::Error> {
		from_body(body)
	}
}

fn from_body<T>(body: Value) -> serde_json::Result<T>
where
	T: serde::de::DeserializeOwned + Default,
{
	if body.is_null() {
		return Ok(T::default());
	}
	serde_json::from_value(body)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the a11ops alerting and telemetry SDK.
//!
//! This crate holds the wire shapes shared by the delivery engine and the
//! telemetry capture layer:
//!
//! - Alerts: [`AlertPayload`] as supplied by callers, [`NormalizedAlert`] as
//!   transmitted, and the [`BatchEnvelope`] for batch delivery
//! - Telemetry: [`TelemetryEvent`], [`Breadcrumb`] and the context records
//!   merged into every event
//! - Metrics: query filters and typed responses of the read-only metrics
//!   endpoints

pub mod alert;
pub mod breadcrumb;
pub mod context;
pub mod error;
pub mod event;
pub mod metrics;

pub use alert::{payloads_from_value, AlertPayload, BatchEnvelope, NormalizedAlert, Severity};
pub use breadcrumb::{Breadcrumb, BreadcrumbLevel};
pub use context::{
	BrowserContext, DeviceContext, OsContext, RequestContext, RuntimeContext, UserContext,
};
pub use error::{CoreError, Result};
pub use event::{Level, Platform, TelemetryEvent};
pub use metrics::{
	DeliveryMetrics, MetricsQuery, RegionMetrics, SlaCompliance, SlaPeriod, SlaQuery, SlaSummary,
	WorkspaceCompliance,
};

/// Current time as an ISO-8601 UTC string with millisecond precision,
/// e.g. `2025-01-31T12:00:00.000Z`.
pub fn iso_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
	at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

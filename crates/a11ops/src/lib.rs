// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert delivery and telemetry SDK for a11ops.
//!
//! This crate provides a client for sending alerts to the a11ops API and for
//! capturing errors and logs from the running application.
//!
//! # Features
//!
//! - **Alert Delivery**: Single and batch alerts with retry on server errors
//! - **Severity Shortcuts**: `critical`, `error`, `warning` and `info`
//! - **Metrics**: Delivery metrics and SLA compliance queries
//! - **Telemetry**: Error, message and structured log capture enriched with
//!   breadcrumbs, scope and platform context
//! - **Instrumentation**: Panic hook on servers, adapter hooks in browsers,
//!   and a tracing layer that records breadcrumbs
//!
//! # Example
//!
//! ```ignore
//! use a11ops::{AlertClient, AlertPayload, CaptureOptions, Severity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AlertClient::builder()
//!         .api_key("wk_live_xxx")
//!         .log_monitoring(true)
//!         .build()?;
//!
//!     client
//!         .send_alert(AlertPayload::new("Database down").severity(Severity::Critical))
//!         .await?;
//!
//!     client
//!         .capture_message("cache warmed", a11ops::Level::Info, CaptureOptions::new())
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod backtrace;
mod breadcrumbs;
mod client;
pub mod config;
mod error;
pub mod instrument;
pub mod platform;
mod scope;
mod telemetry;

pub use breadcrumbs::BreadcrumbBuffer;
pub use client::{AlertClient, AlertClientBuilder, API_KEY_HEADER};
pub use config::{ClientConfig, ConfigError};
pub use error::{classify_status, classify_transport, A11opsError, ErrorKind, Result, NO_RESPONSE_CODE};
pub use instrument::{
	BreadcrumbLayer, BrowserHooks, ClickTarget, ErrorEvent, InstallMode, InstrumentationAdapter,
	RejectionReason, ResponseStatus, ScriptError, XhrSpan,
};
pub use platform::{BrowserHost, Host};
pub use scope::Scope;
pub use telemetry::{CaptureOptions, LogInput, MESSAGE_TYPE};

// Re-export core types for convenience
pub use a11ops_core::{
	AlertPayload, BatchEnvelope, Breadcrumb, BreadcrumbLevel, BrowserContext, DeliveryMetrics,
	DeviceContext, Level, MetricsQuery, NormalizedAlert, OsContext, Platform, RegionMetrics,
	RequestContext, RuntimeContext, Severity, SlaCompliance, SlaPeriod, SlaQuery, SlaSummary,
	TelemetryEvent, UserContext, WorkspaceCompliance,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Send alerts and capture telemetry using the a11ops SDK.
//!
//! Run with:
//!   A11OPS_API_KEY=... cargo run --example send_alert -p a11ops

use a11ops::{
	AlertClientBuilder, AlertPayload, Breadcrumb, BreadcrumbLevel, CaptureOptions, DeliveryMetrics,
	Level, MetricsQuery, Severity, UserContext,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
#[error("payment provider timed out after {0}s")]
struct ProviderTimeout(u64);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let client = AlertClientBuilder::from_env()?
		.log_monitoring(true)
		.environment("development")
		.release("0.1.0-example")
		.build()?;

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.with(client.breadcrumb_layer())
		.init();

	println!("Initializing a11ops client...");
	println!("  Base URL: {}", client.config().base_url);

	// Single alert
	let response = client
		.send_alert(
			AlertPayload::new("Database connection pool exhausted")
				.message("All 50 connections in use for more than 30s")
				.severity(Severity::Critical)
				.field("host", "db-primary-01"),
		)
		.await?;
	println!("Alert sent: {response}");

	// Severity shortcut
	client.warning("Disk usage high", "/var is at 91%").await?;

	// Batch
	client
		.send_batch(vec![
			AlertPayload::new("Replica lag").severity(Severity::Medium),
			AlertPayload::new("Cache hit rate low").severity(Severity::Low),
		])
		.await?;

	// Telemetry
	client.set_user(UserContext::with_id("user_example_123"));
	client.set_tag("example", "true");
	client.add_breadcrumb(
		Breadcrumb::new("default", "checkout")
			.with_message("Cart submitted")
			.with_level(BreadcrumbLevel::Info),
	);
	tracing::info!(order_id = 4411, "charging card");

	let event = client
		.capture_error(&ProviderTimeout(30), CaptureOptions::new().tag("provider", "stripe"))
		.await;
	println!("Error captured: {event:?}");

	client
		.capture_message("Checkout recovered", Level::Info, CaptureOptions::new())
		.await;

	// Metrics
	match client.get_metrics(&MetricsQuery::default()).await {
		Ok(body) => match DeliveryMetrics::try_from(body) {
			Ok(metrics) => println!(
				"Delivered {:?}/{:?} alerts ({:?} failed)",
				metrics.delivered, metrics.total, metrics.failed
			),
			Err(e) => println!("Unexpected metrics shape: {e}"),
		},
		Err(e) => println!("Metrics unavailable: {e}"),
	}

	Ok(())
}

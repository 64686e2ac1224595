// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry capture against the logs endpoint.

use std::time::Duration;

use a11ops::{
	AlertClient, BrowserHost, Breadcrumb, CaptureOptions, ErrorEvent, Host, Level, RejectionReason,
	ScriptError, UserContext,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, API_KEY};

#[derive(Debug, thiserror::Error)]
#[error("connection pool exhausted")]
struct PoolError;

async fn logs_server() -> MockServer {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path(format!("/api/logs/{API_KEY}")))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "eventId": "evt_1" })))
		.mount(&server)
		.await;
	server
}

#[tokio::test]
async fn capture_error_posts_enriched_event() {
	let server = logs_server().await;
	let client = common::builder(&server)
		.log_monitoring(true)
		.environment("staging")
		.release("1.4.2")
		.build()
		.unwrap();

	client.set_user(UserContext::with_id("user_7"));
	client.set_tag("service", "billing");
	client.set_tag("shard", "a");
	client.add_breadcrumb(Breadcrumb::new("navigation", "navigation").with_message("/checkout"));

	let response = client
		.capture_error(&PoolError, CaptureOptions::new().tag("shard", "b"))
		.await;
	assert_eq!(response.unwrap()["eventId"], "evt_1");

	let bodies = common::received_bodies(&server).await;
	let event = &bodies[0];
	assert_eq!(event["type"], "PoolError");
	assert_eq!(event["message"], "connection pool exhausted");
	assert_eq!(event["level"], "error");
	assert_eq!(event["environment"], "staging");
	assert_eq!(event["release"], "1.4.2");
	assert_eq!(event["user"]["id"], "user_7");
	assert_eq!(event["tags"]["service"], "billing");
	assert_eq!(event["tags"]["shard"], "b");
	assert_eq!(event["breadcrumbs"][0]["message"], "/checkout");
	assert!(event["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn capture_message_defaults_environment_to_production() {
	let server = logs_server().await;
	let client = common::builder(&server).log_monitoring(true).build().unwrap();

	client
		.capture_message("cache warmed", Level::Warning, CaptureOptions::new())
		.await;

	let bodies = common::received_bodies(&server).await;
	assert_eq!(bodies[0]["type"], "Message");
	assert_eq!(bodies[0]["message"], "cache warmed");
	assert_eq!(bodies[0]["level"], "warning");
	assert_eq!(bodies[0]["environment"], "production");
}

#[tokio::test]
async fn structured_logs_take_level_and_message_from_fields() {
	let server = logs_server().await;
	let client = common::builder(&server).log_monitoring(true).build().unwrap();

	client
		.capture_log(
			json!({ "message": "slow query", "level": "warning", "ms": 1800 }),
			CaptureOptions::new(),
		)
		.await;

	let bodies = common::received_bodies(&server).await;
	assert_eq!(bodies[0]["message"], "slow query");
	assert_eq!(bodies[0]["level"], "warning");
	assert_eq!(bodies[0]["extra"]["ms"], 1800);
}

#[tokio::test]
async fn capture_is_a_no_op_without_log_monitoring() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = common::client(&server);
	let response = client
		.capture_message("ignored", Level::Info, CaptureOptions::new())
		.await;
	assert!(response.is_none());
}

#[tokio::test]
async fn delivery_failures_resolve_to_none() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(400))
		.expect(1)
		.mount(&server)
		.await;

	let client = common::builder(&server).log_monitoring(true).build().unwrap();
	let response = client
		.capture_message("rejected", Level::Info, CaptureOptions::new())
		.await;
	assert!(response.is_none());
}

fn browser_client(server: &MockServer, auto_capture_errors: bool) -> AlertClient {
	common::builder(server)
		.host(Host::Browser(BrowserHost::new("Mozilla/5.0 Firefox/128.0")))
		.log_monitoring(true)
		.auto_capture_errors(auto_capture_errors)
		.build()
		.unwrap()
}

#[tokio::test]
async fn global_error_listener_captures_location() {
	let server = logs_server().await;
	let client = browser_client(&server, true);
	let hooks = client.browser_hooks().unwrap();

	hooks.on_error(ErrorEvent {
		message: "x is undefined".to_string(),
		error: Some(
			ScriptError::new("TypeError", "x is undefined").with_stack("at render (app.js:10:5)"),
		),
		filename: Some("https://app.example.com/app.js".to_string()),
		lineno: Some(10),
		colno: Some(5),
	});

	let bodies = common::wait_for_requests(&server, 1).await;
	let event = &bodies[0];
	assert_eq!(event["type"], "TypeError");
	assert_eq!(event["message"], "x is undefined");
	assert_eq!(event["stack_trace"], "at render (app.js:10:5)");
	assert_eq!(event["level"], "error");
	assert_eq!(event["platform"], "browser");
	assert_eq!(event["extra"]["filename"], "https://app.example.com/app.js");
	assert_eq!(event["extra"]["lineno"], 10);
	assert_eq!(event["extra"]["colno"], 5);
}

#[tokio::test]
async fn non_error_rejection_becomes_message() {
	let server = logs_server().await;
	let client = browser_client(&server, true);
	let hooks = client.browser_hooks().unwrap();

	hooks.on_unhandled_rejection(RejectionReason::Value(json!({ "code": 7 })));

	let bodies = common::wait_for_requests(&server, 1).await;
	let event = &bodies[0];
	assert_eq!(event["type"], "UnhandledPromiseRejection");
	assert_eq!(event["message"], r#"{"code":7}"#);
	assert_eq!(event["stack_trace"], "");
}

#[tokio::test]
async fn auto_capture_can_be_disabled() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = browser_client(&server, false);
	let hooks = client.browser_hooks().unwrap();

	hooks.on_error(ErrorEvent {
		message: "ignored".to_string(),
		..ErrorEvent::default()
	});
	hooks.on_unhandled_rejection(RejectionReason::Value(json!("ignored")));

	let failed = client.spawn_monitored(async { Err::<(), _>(PoolError) });
	assert_eq!(failed.await.unwrap(), None);

	tokio::time::sleep(Duration::from_millis(50)).await;
	assert!(common::received_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn failed_monitored_task_is_captured() {
	let server = logs_server().await;
	let client = common::builder(&server).log_monitoring(true).build().unwrap();

	let handle = client.spawn_monitored(async { Err::<u32, _>(PoolError) });
	assert_eq!(handle.await.unwrap(), None);

	let bodies = common::received_bodies(&server).await;
	assert_eq!(bodies.len(), 1);
	assert_eq!(bodies[0]["type"], "UnhandledRejection");
	assert_eq!(bodies[0]["message"], "connection pool exhausted");
	assert_eq!(bodies[0]["level"], "error");
}

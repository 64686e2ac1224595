// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry behaviour and error classification.

use a11ops::{AlertClient, AlertPayload, ErrorKind, Host, NO_RESPONSE_CODE};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn server_errors_are_retried_until_success() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(503))
		.up_to_n_times(2)
		.expect(2)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
		.expect(1)
		.mount(&server)
		.await;

	let response = common::client(&server)
		.send_alert(AlertPayload::new("flaky"))
		.await
		.unwrap();
	assert_eq!(response["ok"], true);
}

#[tokio::test]
async fn exhaustion_returns_last_error_after_max_attempts() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(
			ResponseTemplate::new(500).set_body_json(json!({ "message": "backend exploded" })),
		)
		.expect(3)
		.mount(&server)
		.await;

	let err = common::client(&server)
		.send_alert(AlertPayload::new("x"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Server);
	assert_eq!(err.status(), Some(500));
	assert_eq!(err.to_string(), "backend exploded");
	assert_eq!(err.response().unwrap()["message"], "backend exploded");
}

#[tokio::test]
async fn single_attempt_is_not_retried() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(500))
		.expect(1)
		.mount(&server)
		.await;

	let err = common::builder(&server)
		.max_attempts(1)
		.build()
		.unwrap()
		.send_alert(AlertPayload::new("x"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Server);
	assert_eq!(err.status(), Some(500));
	assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(
			ResponseTemplate::new(400).set_body_json(json!({ "message": "title too long" })),
		)
		.expect(1)
		.mount(&server)
		.await;

	let err = common::client(&server)
		.send_alert(AlertPayload::new("x"))
		.await
		.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::Client);
	assert_eq!(err.status(), Some(400));
	assert_eq!(err.to_string(), "title too long");
}

#[tokio::test]
async fn unreachable_backend_reports_no_response() {
	let client = AlertClient::builder()
		.api_key(common::API_KEY)
		.base_url("http://127.0.0.1:9")
		.retry_delay(Duration::from_millis(1))
		.max_attempts(2)
		.host(Host::Unknown)
		.build()
		.unwrap();

	let err = client.send_alert(AlertPayload::new("x")).await.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::NoResponse);
	assert_eq!(err.code(), Some(NO_RESPONSE_CODE));
	assert_eq!(err.to_string(), "No response received from a11ops API");
}

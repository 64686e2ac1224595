// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Alert delivery: normalization, headers, regions and validation.

use a11ops::{AlertPayload, ErrorKind, Severity, API_KEY_HEADER};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, API_KEY};

#[tokio::test]
async fn send_alert_posts_normalized_payload() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path(format!("/alerts/{API_KEY}")))
		.and(header(API_KEY_HEADER, API_KEY))
		.and(header("content-type", "application/json"))
		.and(header_exists("user-agent"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alert_1" })))
		.expect(1)
		.mount(&server)
		.await;

	let client = common::client(&server);
	let response = client
		.send_alert(AlertPayload::new("Database down").field("host", "db-01"))
		.await
		.unwrap();

	assert_eq!(response["id"], "alert_1");

	let bodies = common::received_bodies(&server).await;
	let body = &bodies[0];
	assert_eq!(body["title"], "Database down");
	assert_eq!(body["message"], "");
	assert_eq!(body["severity"], "info");
	assert_eq!(body["host"], "db-01");
	assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
	assert!(body.get("region").is_none());
}

#[tokio::test]
async fn legacy_fields_are_mapped_and_stripped() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	let client = common::client(&server);
	client
		.send_alert_value(json!({
			"title": "Queue backlog",
			"body": "42k messages waiting",
			"priority": "high",
			"workspace": "ws_1",
			"timestamp": "2025-01-31T12:00:00.000Z"
		}))
		.await
		.unwrap();

	let bodies = common::received_bodies(&server).await;
	let body = &bodies[0];
	assert_eq!(body["message"], "42k messages waiting");
	assert_eq!(body["severity"], "high");
	assert_eq!(body["timestamp"], "2025-01-31T12:00:00.000Z");
	assert!(body.get("priority").is_none());
	assert!(body.get("body").is_none());
	assert!(body.get("workspace").is_none());
}

#[tokio::test]
async fn severity_shortcuts_set_severity() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(4)
		.mount(&server)
		.await;

	let client = common::client(&server);
	client.critical("a", "m").await.unwrap();
	client.error("b", "m").await.unwrap();
	client.warning("c", "m").await.unwrap();
	client.info("d", "m").await.unwrap();

	let severities: Vec<_> = common::received_bodies(&server)
		.await
		.into_iter()
		.map(|body| body["severity"].as_str().unwrap().to_string())
		.collect();
	assert_eq!(severities, ["critical", "high", "medium", "info"]);
}

#[tokio::test]
async fn explicit_region_is_sent_and_auto_is_not() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	let regional = common::builder(&server).region("eu-west").build().unwrap();
	regional.send_alert(AlertPayload::new("x")).await.unwrap();
	regional
		.send_batch(vec![AlertPayload::new("y"), AlertPayload::new("z")])
		.await
		.unwrap();

	let auto = common::builder(&server).region("auto").build().unwrap();
	auto.send_alert(AlertPayload::new("x")).await.unwrap();

	let bodies = common::received_bodies(&server).await;
	assert_eq!(bodies[0]["region"], "eu-west");
	assert_eq!(bodies[1]["region"], "eu-west");
	assert!(bodies[1]["alerts"][0].get("region").is_none());
	assert!(bodies[2].get("region").is_none());
}

#[tokio::test]
async fn batch_posts_envelope() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path(format!("/alerts/{API_KEY}/batch")))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accepted": 2 })))
		.expect(1)
		.mount(&server)
		.await;

	let client = common::client(&server);
	let response = client
		.send_batch(vec![
			AlertPayload::new("one").severity(Severity::Low),
			AlertPayload::new("two").severity("custom"),
		])
		.await
		.unwrap();

	assert_eq!(response["accepted"], 2);
	let bodies = common::received_bodies(&server).await;
	let alerts = bodies[0]["alerts"].as_array().unwrap();
	assert_eq!(alerts.len(), 2);
	assert_eq!(alerts[0]["severity"], "low");
	assert_eq!(alerts[1]["severity"], "custom");
}

#[tokio::test]
async fn empty_batch_is_rejected_without_a_request() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = common::client(&server);

	let err = client.send_batch(Vec::new()).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);

	let err = client.send_batch_value(json!([])).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);

	let err = client.send_batch_value(json!({ "title": "x" })).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn null_payload_is_rejected_without_a_request() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let err = common::client(&server)
		.send_alert_value(serde_json::Value::Null)
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn missing_api_key_is_a_validation_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = a11ops::AlertClient::builder()
		.base_url(server.uri())
		.host(a11ops::Host::Unknown)
		.build()
		.unwrap();

	let err = client.send_alert(AlertPayload::new("x")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);
	assert!(err.to_string().contains("A11OPS_API_KEY"));
}

#[tokio::test]
async fn non_json_success_body_is_returned_as_text() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
		.mount(&server)
		.await;

	let response = common::client(&server)
		.send_alert(AlertPayload::new("x"))
		.await
		.unwrap();
	assert_eq!(response, json!("accepted"));
}

#[tokio::test]
async fn api_key_stays_one_path_segment() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/alerts/wk%2Fteam%3Fa%23b"))
		.and(header(API_KEY_HEADER, "wk/team?a#b"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alert_2" })))
		.expect(1)
		.mount(&server)
		.await;

	let client = common::builder(&server).api_key("wk/team?a#b").build().unwrap();
	let response = client.send_alert(AlertPayload::new("x")).await.unwrap();
	assert_eq!(response["id"], "alert_2");
}

#[tokio::test]
async fn non_string_fields_are_forwarded_as_sent() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	common::client(&server)
		.send_alert_value(json!({ "title": "Disk", "severity": 2 }))
		.await
		.unwrap();

	let bodies = common::received_bodies(&server).await;
	assert_eq!(bodies[0]["severity"], 2);
	assert_eq!(bodies[0]["title"], "Disk");
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared helpers for client integration tests.

use std::time::Duration;

use a11ops::{AlertClient, AlertClientBuilder, Host};
use serde_json::Value;
use wiremock::MockServer;

pub const API_KEY: &str = "wk_test_0123456789";

/// A builder pointed at `server` with a short retry delay and no host
/// instrumentation.
pub fn builder(server: &MockServer) -> AlertClientBuilder {
	AlertClient::builder()
		.api_key(API_KEY)
		.base_url(server.uri())
		.retry_delay(Duration::from_millis(1))
		.host(Host::Unknown)
}

pub fn client(server: &MockServer) -> AlertClient {
	builder(server).build().expect("client should build")
}

/// JSON bodies of every request the server received, in order.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
	server
		.received_requests()
		.await
		.unwrap_or_default()
		.iter()
		.map(|request| request.body_json::<Value>().expect("request body should be JSON"))
		.collect()
}

/// Waits until the server has received `count` requests, for captures
/// delivered from detached tasks.
pub async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Value> {
	for _ in 0..200 {
		let bodies = received_bodies(server).await;
		if bodies.len() >= count {
			return bodies;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("expected {count} requests");
}

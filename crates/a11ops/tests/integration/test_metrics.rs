// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Metrics and SLA compliance queries.

use a11ops::{DeliveryMetrics, MetricsQuery, SlaPeriod, SlaQuery};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn delivery_metrics_pass_set_filters_only() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/metrics/delivery"))
		.and(query_param("workspaceId", "ws_1"))
		.and(query_param("startDate", "2025-01-01"))
		.and(query_param("endDate", "2025-01-31"))
		.and(query_param_is_missing("region"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"total": 120,
			"delivered": 118,
			"failed": 2,
			"byRegion": {
				"eu-west": { "total": 60, "delivered": 59, "failed": 1 }
			}
		})))
		.expect(1)
		.mount(&server)
		.await;

	let body = common::client(&server)
		.get_metrics(&MetricsQuery::default().workspace("ws_1").between("2025-01-01", "2025-01-31"))
		.await
		.unwrap();
	assert_eq!(body["total"], 120);

	let metrics = DeliveryMetrics::try_from(body).unwrap();
	assert_eq!(metrics.delivered, Some(118));
	assert_eq!(metrics.failed, Some(2));
	assert_eq!(metrics.by_region.unwrap()["eu-west"].delivered, Some(59));
}

#[tokio::test]
async fn metrics_body_is_returned_unchanged() {
	let server = MockServer::start().await;
	let sent = json!({
		"total": 0,
		"delivered": 0,
		"avgLatency": null,
		"windowNote": "no traffic"
	});
	Mock::given(method("GET"))
		.and(path("/v1/metrics/delivery"))
		.respond_with(ResponseTemplate::new(200).set_body_json(sent.clone()))
		.mount(&server)
		.await;

	let body = common::client(&server)
		.get_metrics(&MetricsQuery::default())
		.await
		.unwrap();
	assert_eq!(body, sent);

	let metrics = DeliveryMetrics::try_from(body).unwrap();
	assert_eq!(metrics.avg_latency, None);
	assert_eq!(metrics.extra["windowNote"], "no traffic");
}

#[tokio::test]
async fn sla_compliance_sends_period() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/metrics/sla"))
		.and(query_param("period", "7d"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"period": "7d",
			"compliance": []
		})))
		.expect(1)
		.mount(&server)
		.await;

	let sla = common::client(&server)
		.get_sla_compliance(&SlaQuery::default().period(SlaPeriod::Week))
		.await
		.unwrap();

	assert_eq!(sla, json!({ "period": "7d", "compliance": [] }));
}

#[tokio::test]
async fn empty_metrics_body_is_null() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/metrics/delivery"))
		.respond_with(ResponseTemplate::new(200))
		.mount(&server)
		.await;

	let body = common::client(&server)
		.get_metrics(&MetricsQuery::default())
		.await
		.unwrap();

	assert!(body.is_null());
	assert_eq!(DeliveryMetrics::try_from(body).unwrap(), DeliveryMetrics::default());
}

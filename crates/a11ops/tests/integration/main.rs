// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the a11ops client.
//!
//! Uses wiremock to stand in for the a11ops API and verifies delivery,
//! retry, metrics queries and telemetry capture end to end.

mod common;

mod test_alerts;
mod test_metrics;
mod test_retry;
mod test_telemetry;

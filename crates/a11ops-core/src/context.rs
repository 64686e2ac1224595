// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context records merged into telemetry events (user, browser, OS, device,
//! runtime, request).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identity of the user affected by an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserContext {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// IP address (sensitive - not displayed by default)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ip_address: Option<String>,
	/// Anything else the application knows about the user.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl UserContext {
	pub fn with_id(id: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			..Self::default()
		}
	}
}

/// Browser identified from the user agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserContext {
	/// "Firefox", "Chrome", "Safari", "Edge", "Opera" or "Unknown"
	pub name: String,
	pub version: String,
	#[serde(rename = "userAgent")]
	pub user_agent: String,
}

/// Operating system of the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsContext {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub arch: Option<String>,
}

/// Display geometry of a browser host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceContext {
	/// `{width}x{height}` of the screen
	pub screen_resolution: String,
	/// `{width}x{height}` of the viewport
	pub viewport: String,
}

/// Language runtime of a server host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeContext {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

/// Page request of a browser host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub headers: BTreeMap<String, String>,
}

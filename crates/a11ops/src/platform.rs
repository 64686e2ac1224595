// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host description and platform context collection.
//!
//! Collection never fails: anything that cannot be determined is reported as
//! `"Unknown"` or left out.

use std::collections::BTreeMap;
use std::sync::{LazyLock, OnceLock};

use a11ops_common_version::BuildInfo;
use a11ops_core::{
	BrowserContext, DeviceContext, OsContext, Platform, RequestContext, RuntimeContext,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

const UNKNOWN: &str = "Unknown";

static FIREFOX_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Firefox/(\d+)").unwrap());
static CHROME_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Chrome/(\d+)").unwrap());
static SAFARI_VERSION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Version/(\d+).*Safari").unwrap());
static EDGE_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Edge/(\d+)").unwrap());

/// What the client is running inside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Host {
	/// An embedding browser-like host that describes itself.
	Browser(BrowserHost),
	/// A native process.
	#[default]
	Server,
	Unknown,
}

impl Host {
	pub fn platform(&self) -> Platform {
		match self {
			Self::Browser(_) => Platform::Browser,
			Self::Server => Platform::Server,
			Self::Unknown => Platform::Unknown,
		}
	}

	/// Contexts describing this host, keyed `browser`/`os`/`device` or
	/// `runtime`/`os`.
	pub fn collect_contexts(&self) -> Map<String, Value> {
		let mut contexts = Map::new();
		match self {
			Self::Browser(browser) => {
				insert(&mut contexts, "browser", browser.browser_context());
				insert(
					&mut contexts,
					"os",
					OsContext {
						name: os_name(&browser.user_agent).to_string(),
						version: None,
						arch: None,
					},
				);
				insert(&mut contexts, "device", browser.device_context());
			}
			Self::Server => {
				let build = BuildInfo::current();
				insert(
					&mut contexts,
					"runtime",
					RuntimeContext {
						name: "rust".to_string(),
						version: build.rustc_version().map(str::to_string),
					},
				);
				insert(
					&mut contexts,
					"os",
					OsContext {
						name: std::env::consts::OS.to_string(),
						version: kernel_release().map(str::to_string),
						arch: Some(std::env::consts::ARCH.to_string()),
					},
				);
			}
			Self::Unknown => {}
		}
		contexts
	}

	/// Page request details, only known on browser hosts.
	pub fn request_context(&self) -> Option<RequestContext> {
		let Self::Browser(browser) = self else {
			return None;
		};
		let mut headers = BTreeMap::new();
		headers.insert("User-Agent".to_string(), browser.user_agent.clone());
		Some(RequestContext {
			url: browser.url.clone(),
			headers,
		})
	}
}

/// Self-description supplied by a browser-like embedding host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserHost {
	pub user_agent: String,
	/// Screen size as (width, height).
	pub screen: (u32, u32),
	/// Viewport size as (width, height).
	pub viewport: (u32, u32),
	/// Current page location.
	pub url: Option<String>,
}

impl BrowserHost {
	pub fn new(user_agent: impl Into<String>) -> Self {
		Self {
			user_agent: user_agent.into(),
			..Self::default()
		}
	}

	pub fn with_screen(mut self, width: u32, height: u32) -> Self {
		self.screen = (width, height);
		self
	}

	pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
		self.viewport = (width, height);
		self
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	fn browser_context(&self) -> BrowserContext {
		BrowserContext {
			name: browser_name(&self.user_agent).to_string(),
			version: browser_version(&self.user_agent),
			user_agent: self.user_agent.clone(),
		}
	}

	fn device_context(&self) -> DeviceContext {
		DeviceContext {
			screen_resolution: format!("{}x{}", self.screen.0, self.screen.1),
			viewport: format!("{}x{}", self.viewport.0, self.viewport.1),
		}
	}
}

/// Browser family by substring, checked in the order Firefox, Chrome, Safari,
/// Edge, Opera.
pub fn browser_name(user_agent: &str) -> &'static str {
	if user_agent.contains("Firefox") {
		"Firefox"
	} else if user_agent.contains("Chrome") {
		"Chrome"
	} else if user_agent.contains("Safari") {
		"Safari"
	} else if user_agent.contains("Edge") {
		"Edge"
	} else if user_agent.contains("Opera") || user_agent.contains("OPR") {
		"Opera"
	} else {
		UNKNOWN
	}
}

/// Major browser version.
pub fn browser_version(user_agent: &str) -> String {
	[&FIREFOX_VERSION, &CHROME_VERSION, &SAFARI_VERSION, &EDGE_VERSION]
		.iter()
		.find_map(|re| re.captures(user_agent))
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
		.unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn os_name(user_agent: &str) -> &'static str {
	if user_agent.contains("Windows") {
		"Windows"
	} else if user_agent.contains("Mac") {
		"MacOS"
	} else if user_agent.contains("Linux") {
		"Linux"
	} else if user_agent.contains("Android") {
		"Android"
	} else if user_agent.contains("iOS") {
		"iOS"
	} else {
		UNKNOWN
	}
}

/// Kernel release from `/proc/version`, where present.
fn kernel_release() -> Option<&'static str> {
	static RELEASE: OnceLock<Option<String>> = OnceLock::new();
	RELEASE
		.get_or_init(|| {
			std::fs::read_to_string("/proc/version")
				.ok()
				.and_then(|v| v.split_whitespace().nth(2).map(String::from))
		})
		.as_deref()
}

fn insert<T: Serialize>(contexts: &mut Map<String, Value>, key: &str, value: T) {
	if let Ok(value) = serde_json::to_value(value) {
		contexts.insert(key.to_string(), value);
	}
}

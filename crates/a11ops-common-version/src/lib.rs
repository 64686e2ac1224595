// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build and version information for the a11ops SDK.
//!
//! A single source of truth for the SDK version, git SHA, compiler version
//! and target platform. The HTTP layer derives its `User-Agent` from here and
//! the telemetry layer reports the runtime version from here.

shadow_rs::shadow!(build);

#[cfg(feature = "serde")]
use serde::Serialize;

/// SDK name reported in the `User-Agent` header and event tags.
pub const SDK_NAME: &str = "a11ops-rust";

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
///
/// Derived at compile time from target configuration.
pub const PLATFORM: &str = env!("A11OPS_PLATFORM");

/// Build information baked in at compile time.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	pub git_sha: &'static str,
	pub rustc: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	/// Get the current build information (compile-time constants).
	#[allow(clippy::const_is_empty)]
	pub const fn current() -> Self {
		Self {
			version: build::PKG_VERSION,
			git_sha: if build::SHORT_COMMIT.is_empty() {
				"unknown"
			} else {
				build::SHORT_COMMIT
			},
			rustc: build::RUST_VERSION,
			platform: PLATFORM,
		}
	}

	/// The bare compiler version, e.g. "1.80.0" out of
	/// "rustc 1.80.0 (051478957 2024-07-21)".
	pub fn rustc_version(&self) -> Option<&'static str> {
		let rustc: &'static str = self.rustc;
		rustc
			.split_whitespace()
			.nth(1)
			.filter(|v| v.chars().next().is_some_and(|c| c.is_ascii_digit()))
	}
}

/// The SDK version string.
pub const fn sdk_version() -> &'static str {
	build::PKG_VERSION
}

/// The fixed `User-Agent` value: `a11ops-rust/{version}`.
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{}", sdk_version())
}

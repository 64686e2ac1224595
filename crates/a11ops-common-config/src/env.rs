// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention used by Docker and
//! Kubernetes secret mounts. Plain settings are read with typed parsing so a
//! malformed value is reported instead of silently replaced by a default.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use thiserror::Error;

use crate::secret::Secret;

/// Errors that can occur when reading configuration from the environment.
#[derive(Debug, Error)]
pub enum EnvError {
	/// Failed to read the secret file.
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// The secret file path was empty.
	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },

	/// A value was present but could not be parsed.
	#[error("invalid value for {var}: {value:?} ({reason})")]
	Invalid {
		var: String,
		value: String,
		reason: String,
	},
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// 1. If `{var}_FILE` is set, read the secret from that path (a single
///    trailing newline is stripped)
/// 2. Otherwise, if `{var}` is set and non-empty, use it directly
/// 3. Otherwise, return `Ok(None)`
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, EnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(EnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| EnvError::Io {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(Secret::new(secret)));
	}

	Ok(env_var(var).map(Secret::new))
}

/// A non-empty, trimmed environment variable.
pub fn env_var(var: &str) -> Option<String> {
	env::var(var)
		.ok()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
}

/// Parse an environment variable with [`FromStr`].
pub fn env_parse<T>(var: &str) -> Result<Option<T>, EnvError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match env_var(var) {
		None => Ok(None),
		Some(value) => value.parse::<T>().map(Some).map_err(|e| EnvError::Invalid {
			var: var.to_string(),
			reason: e.to_string(),
			value,
		}),
	}
}

/// Parse a boolean toggle: `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn env_flag(var: &str) -> Result<Option<bool>, EnvError> {
	let Some(value) = env_var(var) else {
		return Ok(None);
	};

	match value.to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(Some(true)),
		"false" | "0" | "no" | "off" => Ok(Some(false)),
		_ => Err(EnvError::Invalid {
			var: var.to_string(),
			value,
			reason: "expected a boolean".to_string(),
		}),
	}
}

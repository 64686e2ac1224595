// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the a11ops SDK and classification of failed transport
//! calls.

use a11ops_common_http::RetryableError;
use a11ops_core::CoreError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, A11opsError>;

/// Fixed code carried by [`A11opsError::NoResponse`].
pub const NO_RESPONSE_CODE: &str = "ENORESPONSE";

/// Retry-relevant category of an [`A11opsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Validation,
	Client,
	Server,
	NoResponse,
	Local,
}

/// Errors that can occur in the a11ops SDK.
#[derive(Debug, Error)]
pub enum A11opsError {
	/// Caller input was rejected before any network I/O.
	#[error("{0}")]
	Validation(String),

	/// The backend answered with a 4xx status.
	#[error("{message}")]
	Client {
		status: u16,
		message: String,
		response: Option<Value>,
	},

	/// The backend answered with a 5xx or otherwise unsuccessful status.
	#[error("{message}")]
	Server {
		status: u16,
		message: String,
		response: Option<Value>,
	},

	/// The request was sent but nothing came back (network failure or timeout).
	#[error("No response received from a11ops API")]
	NoResponse(#[source] reqwest::Error),

	/// The request could not be built or its response could not be read.
	#[error("HTTP request failed: {0}")]
	Local(#[source] reqwest::Error),

	/// Failed to serialize a payload.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Configuration could not be loaded.
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),
}

impl A11opsError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Validation(_) => ErrorKind::Validation,
			Self::Client { .. } => ErrorKind::Client,
			Self::Server { .. } => ErrorKind::Server,
			Self::NoResponse(_) => ErrorKind::NoResponse,
			Self::Local(_) | Self::Serialization(_) | Self::Config(_) => ErrorKind::Local,
		}
	}

	/// HTTP status for errors that carry a backend response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// `ENORESPONSE` when no response was received.
	pub fn code(&self) -> Option<&'static str> {
		match self {
			Self::NoResponse(_) => Some(NO_RESPONSE_CODE),
			_ => None,
		}
	}

	/// The parsed response body, if the backend sent one.
	pub fn response(&self) -> Option<&Value> {
		match self {
			Self::Client { response, .. } | Self::Server { response, .. } => response.as_ref(),
			_ => None,
		}
	}
}

impl RetryableError for A11opsError {
	fn is_retryable(&self) -> bool {
		matches!(self.kind(), ErrorKind::Server | ErrorKind::NoResponse)
	}
}

impl From<CoreError> for A11opsError {
	fn from(err: CoreError) -> Self {
		Self::Validation(err.to_string())
	}
}

/// Classify an unsuccessful response.
///
/// The message is the body's `message` field when present, otherwise
/// "Request failed with status N".
pub fn classify_status(status: StatusCode, response: Option<Value>) -> A11opsError {
	let code = status.as_u16();
	let message = response
		.as_ref()
		.and_then(|body| body.get("message"))
		.and_then(Value::as_str)
		.filter(|m| !m.is_empty())
		.map(str::to_string)
		.unwrap_or_else(|| format!("Request failed with status {code}"));

	if status.is_client_error() {
		A11opsError::Client {
			status: code,
			message,
			response,
		}
	} else {
		A11opsError::Server {
			status: code,
			message,
			response,
		}
	}
}

/// Classify a transport failure that produced no usable response.
pub fn classify_transport(err: reqwest::Error) -> A11opsError {
	if err.is_timeout() || err.is_connect() || (err.is_request() && !err.is_builder()) {
		A11opsError::NoResponse(err)
	} else {
		A11opsError::Local(err)
	}
}

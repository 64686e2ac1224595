// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for core type construction.

use thiserror::Error;

/// Errors raised while building or parsing core types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	/// Malformed or absent caller input.
	#[error("{0}")]
	Validation(String),

	#[error("invalid level: {0}")]
	InvalidLevel(String),

	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

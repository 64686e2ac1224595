// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the a11ops SDK.
//!
//! This crate provides:
//! - A pre-configured HTTP client with the fixed SDK User-Agent and JSON
//!   content type
//! - A retry loop with exponential backoff for transient failures

mod client;
mod retry;

pub use client::{
	blocking_builder, builder, default_headers, new_client_with_timeout, user_agent,
};
pub use retry::{retry, RetryPolicy, RetryableError};

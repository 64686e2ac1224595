// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives for the a11ops SDK.
//!
//! - [`Secret<T>`]: a wrapper that keeps API keys out of logs, `Debug`
//!   output and serialized config dumps
//! - [`load_secret_env`]: load a secret from `VAR` or from the file named by
//!   `VAR_FILE`
//! - [`env_var`], [`env_parse`], [`env_flag`]: typed lookups for plain
//!   settings

pub mod env;
mod secret;

pub use env::{env_flag, env_parse, env_var, load_secret_env, EnvError};
pub use secret::{Secret, SecretString, REDACTED};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User, context and tag state merged into every captured event.

use std::collections::BTreeMap;
use std::sync::RwLock;

use a11ops_core::UserContext;
use serde_json::{Map, Value};

/// Mutable scope shared by all captures of one client. Last write wins.
#[derive(Debug, Default)]
pub struct Scope {
	user: RwLock<UserContext>,
	context: RwLock<Map<String, Value>>,
	tags: RwLock<BTreeMap<String, String>>,
}

impl Scope {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the whole user record.
	pub fn set_user(&self, user: UserContext) {
		*self.user.write().unwrap_or_else(|e| e.into_inner()) = user;
	}

	pub fn set_context(&self, key: impl Into<String>, value: Value) {
		self.context
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(key.into(), value);
	}

	pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
		self.tags
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.insert(key.into(), value.into());
	}

	pub fn user(&self) -> UserContext {
		self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
	}

	pub fn context(&self) -> Map<String, Value> {
		self.context.read().unwrap_or_else(|e| e.into_inner()).clone()
	}

	pub fn tags(&self) -> BTreeMap<String, String> {
		self.tags.read().unwrap_or_else(|e| e.into_inner()).clone()
	}
}

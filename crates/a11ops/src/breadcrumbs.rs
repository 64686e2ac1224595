// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded breadcrumb trail.

use std::collections::VecDeque;
use std::sync::Mutex;

use a11ops_core::Breadcrumb;
use chrono::Utc;

/// Fixed-capacity, oldest-first log of recent breadcrumbs.
///
/// Adding beyond capacity evicts the oldest entry. There is no other way to
/// remove entries.
#[derive(Debug)]
pub struct BreadcrumbBuffer {
	capacity: usize,
	entries: Mutex<VecDeque<Breadcrumb>>,
}

impl BreadcrumbBuffer {
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity,
			entries: Mutex::new(VecDeque::with_capacity(capacity)),
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Append a breadcrumb, stamping the current time if it has none.
	pub fn add(&self, mut breadcrumb: Breadcrumb) {
		if breadcrumb.timestamp.is_none() {
			breadcrumb.timestamp = Some(Utc::now().timestamp_millis());
		}

		let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
		entries.push_back(breadcrumb);
		while entries.len() > self.capacity {
			entries.pop_front();
		}
	}

	/// Owned copy of the trail, oldest first.
	pub fn snapshot(&self) -> Vec<Breadcrumb> {
		let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
		entries.iter().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

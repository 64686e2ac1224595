// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook integration for automatic fatal error reporting.

use std::panic::{Location, PanicHookInfo};
use std::sync::Weak;

use a11ops_core::{Level, TelemetryEvent};
use tracing::error;

use crate::backtrace::{capture_frames, render_stack};
use crate::client::ClientInner;
use crate::telemetry::{CaptureOptions, Report};

/// Event type of captured panics.
pub const PANIC_TYPE: &str = "panic";

/// Install a panic hook that reports panics before calling the previous hook.
pub(crate) fn install_panic_hook(client: Weak<ClientInner>) {
	let previous = std::panic::take_hook();

	std::panic::set_hook(Box::new(move |info| {
		report_panic(&client, info);
		previous(info);
	}));
}

fn report_panic(client: &Weak<ClientInner>, info: &PanicHookInfo<'_>) {
	let Some(inner) = client.upgrade() else {
		return;
	};
	if !inner.config.auto_capture_errors {
		return;
	}

	let event = panic_event(&inner, extract_panic_message(info), info.location());

	// The panicking thread may be inside a runtime, where blocking I/O is
	// not allowed.
	let sender = std::thread::Builder::new()
		.name("a11ops-panic-report".to_string())
		.spawn(move || inner.send_event_blocking(&event));
	match sender {
		Ok(handle) => {
			if handle.join().is_err() {
				error!("panic report thread panicked");
			}
		}
		Err(e) => error!(error = %e, "failed to spawn panic report thread"),
	}
}

/// Fatal event for a panic, with the panic location in `extra`.
fn panic_event(
	inner: &ClientInner,
	message: String,
	location: Option<&Location<'_>>,
) -> TelemetryEvent {
	let stack_trace = render_stack(PANIC_TYPE, &message, &capture_frames());

	let mut options = CaptureOptions::new();
	if let Some(location) = location {
		options = options.extra(
			"location",
			format!("{}:{}:{}", location.file(), location.line(), location.column()),
		);
	}
	let report = Report {
		kind: PANIC_TYPE.to_string(),
		message,
		stack_trace,
	};
	inner.build_event(report, Level::Fatal, options)
}

/// Extract the panic message from panic info.
fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
	if let Some(s) = info.payload().downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = info.payload().downcast_ref::<String>() {
		s.clone()
	} else {
		"Box<dyn Any>".to_string()
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and rendering into the textual `stack_trace` of an event.

use std::fmt::Write;

use ::backtrace::Backtrace;
use rustc_demangle::demangle;

/// Frames on top of the stack that belong to capture or panic machinery
/// rather than to the code that failed.
const MACHINERY_PREFIXES: &[&str] = &[
	"backtrace::",
	"<backtrace::",
	"a11ops::",
	"<a11ops::",
	"std::panicking::",
	"std::panic::",
	"core::panicking::",
	"<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call",
	"rust_begin_unwind",
	"__rustc::",
];

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
	pub function: String,
	pub file: Option<String>,
	pub line: Option<u32>,
}

/// Capture the current stack, leading machinery frames removed.
pub fn capture_frames() -> Vec<FrameLine> {
	let backtrace = Backtrace::new();
	let frames = backtrace
		.frames()
		.iter()
		.flat_map(|frame| frame.symbols())
		.map(|symbol| FrameLine {
			function: symbol
				.name()
				.and_then(|name| name.as_str())
				.map(|raw| format!("{:#}", demangle(raw)))
				.unwrap_or_else(|| "<unknown>".to_string()),
			file: symbol.filename().map(|p| p.display().to_string()),
			line: symbol.lineno(),
		})
		.collect();
	strip_machinery(frames)
}

fn strip_machinery(frames: Vec<FrameLine>) -> Vec<FrameLine> {
	frames
		.into_iter()
		.skip_while(|frame| is_machinery(&frame.function))
		.collect()
}

fn is_machinery(function: &str) -> bool {
	MACHINERY_PREFIXES
		.iter()
		.any(|prefix| function.starts_with(prefix))
}

/// Render `{kind}: {message}` followed by one `    at` line per frame.
pub fn render_stack(kind: &str, message: &str, frames: &[FrameLine]) -> String {
	let mut out = format!("{kind}: {message}");
	for frame in frames {
		let _ = match (&frame.file, frame.line) {
			(Some(file), Some(line)) => write!(out, "\n    at {} ({file}:{line})", frame.function),
			(Some(file), None) => write!(out, "\n    at {} ({file})", frame.function),
			_ => write!(out, "\n    at {}", frame.function),
		};
	}
	out
}

/// Render an error's `source()` chain as `Caused by:` lines.
pub fn render_error_chain(
	kind: &str,
	error: &(dyn std::error::Error + 'static),
) -> String {
	let mut out = format!("{kind}: {error}");
	let mut source = error.source();
	while let Some(cause) = source {
		let _ = write!(out, "\nCaused by: {cause}");
		source = cause.source();
	}
	out
}

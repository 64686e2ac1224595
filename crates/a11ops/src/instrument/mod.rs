// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Automatic instrumentation.
//!
//! The install mode is chosen once per client from its [`Host`]:
//!
//! - Browser hosts get a [`BrowserHooks`] handle, passed to every registered
//!   [`InstrumentationAdapter`] so the host can wire it into its listeners
//! - Server hosts get a chained panic hook; fallible tasks are monitored with
//!   [`AlertClient::spawn_monitored`]
//!
//! Nothing is installed while log monitoring is disabled. There is no
//! uninstall.

mod hooks;
mod panic_hook;
mod tracing_layer;

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::AlertClient;
use crate::platform::Host;
use crate::telemetry::CaptureOptions;

pub use hooks::{
	BrowserHooks, ClickTarget, ErrorEvent, RejectionReason, ResponseStatus, ScriptError, XhrSpan,
	UNHANDLED_PROMISE_REJECTION,
};
pub use panic_hook::PANIC_TYPE;
pub use tracing_layer::BreadcrumbLayer;

/// Event type of errors returned by tasks started with
/// [`AlertClient::spawn_monitored`].
pub const UNHANDLED_REJECTION: &str = "UnhandledRejection";

/// Wires [`BrowserHooks`] into a host's listeners and wrapped APIs.
///
/// Called once, when the client is built.
pub trait InstrumentationAdapter: Send + Sync {
	fn install(&self, hooks: BrowserHooks);
}

impl<F> InstrumentationAdapter for F
where
	F: Fn(BrowserHooks) + Send + Sync,
{
	fn install(&self, hooks: BrowserHooks) {
		self(hooks)
	}
}

/// What was installed for a client.
#[derive(Debug, Clone)]
pub enum InstallMode {
	Disabled,
	Browser(BrowserHooks),
	Server,
}

/// Holds the install outcome; set exactly once.
#[derive(Debug, Default)]
pub(crate) struct Installer {
	mode: OnceLock<InstallMode>,
}

impl Installer {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn mode(&self) -> Option<&InstallMode> {
		self.mode.get()
	}
}

/// Installs instrumentation for `client`. Later calls return the first
/// outcome without installing anything.
pub(crate) fn install(
	client: &AlertClient,
	adapters: Vec<Box<dyn InstrumentationAdapter>>,
) -> &InstallMode {
	client.inner.installer.mode.get_or_init(|| {
		if !client.inner.config.log_monitoring {
			return InstallMode::Disabled;
		}

		match &client.inner.host {
			Host::Browser(_) => {
				let hooks = BrowserHooks::new(Arc::downgrade(&client.inner));
				for adapter in &adapters {
					adapter.install(hooks.clone());
				}
				debug!(adapters = adapters.len(), "browser instrumentation installed");
				InstallMode::Browser(hooks)
			}
			Host::Server => {
				panic_hook::install_panic_hook(Arc::downgrade(&client.inner));
				debug!("panic hook installed");
				InstallMode::Server
			}
			Host::Unknown => InstallMode::Disabled,
		}
	})
}

impl AlertClient {
	/// The install outcome of this client.
	pub fn install_mode(&self) -> &InstallMode {
		self.inner
			.installer
			.mode()
			.unwrap_or(&InstallMode::Disabled)
	}

	/// The hooks handle on browser hosts with log monitoring enabled.
	pub fn browser_hooks(&self) -> Option<BrowserHooks> {
		match self.install_mode() {
			InstallMode::Browser(hooks) => Some(hooks.clone()),
			_ => None,
		}
	}

	/// A tracing layer recording events as breadcrumbs for this client.
	pub fn breadcrumb_layer(&self) -> BreadcrumbLayer {
		BreadcrumbLayer::new(self)
	}

	/// Spawns a fallible task. An `Err` outcome is captured with type
	/// `UnhandledRejection` and the handle resolves to `None`.
	///
	/// Must be called within a tokio runtime.
	pub fn spawn_monitored<F, T, E>(&self, future: F) -> JoinHandle<Option<T>>
	where
		F: Future<Output = Result<T, E>> + Send + 'static,
		T: Send + 'static,
		E: std::error::Error + Send + 'static,
	{
		let client = self.clone();
		tokio::spawn(async move {
			match future.await {
				Ok(value) => Some(value),
				Err(err) => {
					if client.inner.config.auto_capture_errors {
						let options = CaptureOptions::new().kind(UNHANDLED_REJECTION);
						client.capture_error(&err, options).await;
					}
					None
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::platform::BrowserHost;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn adapters_receive_hooks_once_on_browser_hosts() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();

		let client = AlertClient::builder()
			.host(Host::Browser(BrowserHost::new("Mozilla/5.0")))
			.log_monitoring(true)
			.adapter(move |_hooks: BrowserHooks| {
				seen.fetch_add(1, Ordering::SeqCst);
			})
			.build()
			.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(client.browser_hooks().is_some());

		let again = install(&client, Vec::new());
		assert!(matches!(again, InstallMode::Browser(_)));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn nothing_installed_without_log_monitoring() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();

		let client = AlertClient::builder()
			.host(Host::Browser(BrowserHost::new("Mozilla/5.0")))
			.adapter(move |_hooks: BrowserHooks| {
				seen.fetch_add(1, Ordering::SeqCst);
			})
			.build()
			.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(matches!(client.install_mode(), InstallMode::Disabled));
		assert!(client.browser_hooks().is_none());
	}

	#[test]
	fn server_hosts_install_panic_hook() {
		let client = AlertClient::builder()
			.host(Host::Server)
			.log_monitoring(true)
			.build()
			.unwrap();

		assert!(matches!(client.install_mode(), InstallMode::Server));
		assert!(client.browser_hooks().is_none());
	}

	#[derive(Debug, thiserror::Error)]
	#[error("job failed")]
	struct JobError;

	#[tokio::test]
	async fn spawn_monitored_passes_values_through() {
		let client = AlertClient::builder().host(Host::Unknown).build().unwrap();

		let ok = client.spawn_monitored(async { Ok::<_, JobError>(7) });
		let failed = client.spawn_monitored(async { Err::<u32, _>(JobError) });

		assert_eq!(ok.await.unwrap(), Some(7));
		assert_eq!(failed.await.unwrap(), None);
	}
}

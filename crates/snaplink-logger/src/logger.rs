// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Queue processing: initialization handshake, batch timer, drain cycles
//! and flush.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use snaplink_common_http::{doubling_delay, retry, RetryConfig};
use snaplink_config::{Environment, SnapLinkConfig};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::entry::{LogEntry, LogLevel};
use crate::error::{LoggerError, Result};
use crate::queue::LogQueue;
use crate::transport::LogTransport;

/// How often `flush` checks whether the queue has emptied.
pub const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Logger tuning and the application identity stamped on every entry.
#[derive(Debug, Clone)]
pub struct LoggerSettings {
	pub environment: Environment,
	pub version: String,
	pub batch_size: usize,
	pub batch_timeout: Duration,
	/// Base delay for initialization backoff and single-entry retries.
	pub retry_delay: Duration,
	/// Retries after the first attempt in [`Logger::send_now`].
	pub max_retries: u32,
	pub shutdown_timeout: Duration,
}

impl Default for LoggerSettings {
	fn default() -> Self {
		Self {
			environment: Environment::Development,
			version: env!("CARGO_PKG_VERSION").to_string(),
			batch_size: 10,
			batch_timeout: Duration::from_millis(2000),
			retry_delay: Duration::from_millis(1000),
			max_retries: 3,
			shutdown_timeout: Duration::from_millis(1000),
		}
	}
}

impl LoggerSettings {
	pub fn from_config(config: &SnapLinkConfig) -> Self {
		Self {
			environment: config.app.environment,
			version: config.app.version.clone(),
			batch_size: config.logger.batch_size,
			batch_timeout: config.logger.batch_timeout,
			retry_delay: config.logger.retry_delay,
			max_retries: config.logger.max_retries,
			shutdown_timeout: config.logger.shutdown_timeout,
		}
	}

	/// Production keeps INFO and above; everything else keeps DEBUG.
	fn threshold(&self) -> LogLevel {
		if self.environment.is_production() {
			LogLevel::Info
		} else {
			LogLevel::Debug
		}
	}
}

struct Inner {
	settings: LoggerSettings,
	threshold: LogLevel,
	transport: Arc<dyn LogTransport>,
	queue: Mutex<LogQueue>,
	/// Held for the duration of one drain cycle.
	draining: AtomicBool,
	/// At most one pending batch timer.
	timer_armed: AtomicBool,
	initialized: AtomicBool,
	initializing: AtomicBool,
	init_failures: AtomicU32,
	closed: AtomicBool,
	cancel: CancellationToken,
}

/// Remote logger handle. Clones share one queue.
#[derive(Clone)]
pub struct Logger {
	inner: Arc<Inner>,
}

impl Logger {
	/// A `batch_size` of zero is treated as one.
	pub fn new(mut settings: LoggerSettings, transport: Arc<dyn LogTransport>) -> Self {
		settings.batch_size = settings.batch_size.max(1);
		let threshold = settings.threshold();
		Self {
			inner: Arc::new(Inner {
				settings,
				threshold,
				transport,
				queue: Mutex::new(LogQueue::new()),
				draining: AtomicBool::new(false),
				timer_armed: AtomicBool::new(false),
				initialized: AtomicBool::new(false),
				initializing: AtomicBool::new(false),
				init_failures: AtomicU32::new(0),
				closed: AtomicBool::new(false),
				cancel: CancellationToken::new(),
			}),
		}
	}

	/// Runs the initialization handshake once.
	///
	/// On failure, retries continue in the background with doubling delays
	/// until one succeeds or the logger shuts down.
	pub async fn start(&self) -> bool {
		if self.inner.initialized.load(Ordering::SeqCst) {
			return true;
		}
		if self.inner.initializing.swap(true, Ordering::SeqCst) {
			return false;
		}
		self.inner.initialize().await
	}

	pub fn is_initialized(&self) -> bool {
		self.inner.initialized.load(Ordering::SeqCst)
	}

	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	pub async fn queue_len(&self) -> usize {
		self.inner.queue.lock().await.len()
	}

	/// Queues an entry for delivery.
	///
	/// Delivery failures never surface here; the only error is a closed
	/// logger.
	pub async fn log(
		&self,
		level: LogLevel,
		source: &str,
		message: &str,
		data: Value,
	) -> Result<()> {
		let inner = &self.inner;

		if inner.closed.load(Ordering::SeqCst) {
			return Err(LoggerError::Shutdown);
		}

		if !level.is_enabled(inner.threshold) {
			return Ok(());
		}

		let entry = LogEntry::new(
			level,
			source,
			message,
			data,
			inner.settings.environment.as_str(),
			inner.settings.version.as_str(),
		);

		if !inner.settings.environment.is_production() {
			echo(&entry);
		}

		let len = {
			let mut queue = inner.queue.lock().await;
			queue.push(entry);
			queue.len()
		};

		if !inner.initialized.load(Ordering::SeqCst) {
			if len == 1 && !inner.initializing.swap(true, Ordering::SeqCst) {
				let inner = Arc::clone(inner);
				tokio::spawn(async move {
					inner.initialize().await;
				});
			}
			return Ok(());
		}

		if len >= inner.settings.batch_size {
			inner.spawn_drain();
		} else if !inner.timer_armed.swap(true, Ordering::SeqCst) {
			inner.arm_batch_timer();
		}

		Ok(())
	}

	pub async fn error(&self, source: &str, message: &str, data: Value) -> Result<()> {
		self.log(LogLevel::Error, source, message, data).await
	}

	pub async fn warn(&self, source: &str, message: &str, data: Value) -> Result<()> {
		self.log(LogLevel::Warn, source, message, data).await
	}

	pub async fn info(&self, source: &str, message: &str, data: Value) -> Result<()> {
		self.log(LogLevel::Info, source, message, data).await
	}

	pub async fn debug(&self, source: &str, message: &str, data: Value) -> Result<()> {
		self.log(LogLevel::Debug, source, message, data).await
	}

	/// A handle that logs every entry under `source`.
	pub fn scoped(&self, source: impl Into<String>) -> ScopedLogger {
		ScopedLogger {
			logger: self.clone(),
			source: source.into(),
		}
	}

	/// Delivers one entry immediately to the single-entry endpoint, bypassing
	/// the queue, with doubling backoff between retries.
	pub async fn send_now(&self, entry: &LogEntry) -> Result<()> {
		let settings = &self.inner.settings;
		let cfg = RetryConfig::doubling(settings.max_retries, settings.retry_delay);
		retry(&cfg, || async { self.inner.transport.send_entry(entry).await }).await
	}

	/// Triggers a drain and waits until the queue is empty or `timeout`
	/// elapses. Returns whether the queue emptied; a timeout leaves all
	/// pending entries queued.
	pub async fn flush(&self, timeout: Duration) -> bool {
		if self.queue_len().await == 0 {
			return true;
		}

		self.inner.spawn_drain();

		let deadline = Instant::now() + timeout;
		loop {
			let now = Instant::now();
			if now >= deadline {
				return self.queue_len().await == 0;
			}

			tokio::time::sleep(FLUSH_POLL_INTERVAL.min(deadline - now)).await;

			if self.queue_len().await == 0 {
				return true;
			}
		}
	}

	/// Stops accepting entries, flushes within the shutdown timeout and
	/// cancels background work. Returns the number of undelivered entries.
	pub async fn shutdown(&self) -> usize {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return self.queue_len().await;
		}

		info!("shutting down remote logger");

		let delivered = self.flush(self.inner.settings.shutdown_timeout).await;
		self.inner.cancel.cancel();

		let undelivered = self.queue_len().await;
		if delivered {
			info!("remote logger shutdown complete");
		} else {
			warn!(undelivered, "remote logger shut down with undelivered entries");
		}
		undelivered
	}
}

impl Inner {
	async fn initialize(self: &Arc<Self>) -> bool {
		if self.transport.initialize().await {
			self.initialized.store(true, Ordering::SeqCst);
			self.initializing.store(false, Ordering::SeqCst);
			self.init_failures.store(0, Ordering::SeqCst);
			info!("remote logger initialized");
			self.spawn_drain();
			return true;
		}

		let failures = self.init_failures.fetch_add(1, Ordering::SeqCst) + 1;
		let delay = doubling_delay(self.settings.retry_delay, failures);
		warn!(
			attempt = failures,
			delay_ms = delay.as_millis() as u64,
			"remote logger initialization failed, will retry"
		);
		self.schedule_initialize(delay);
		false
	}

	fn schedule_initialize(self: &Arc<Self>, delay: Duration) {
		let inner = Arc::clone(self);
		tokio::spawn(async move {
			tokio::select! {
				_ = inner.cancel.cancelled() => {
					inner.initializing.store(false, Ordering::SeqCst);
				}
				_ = tokio::time::sleep(delay) => {
					inner.initialize().await;
				}
			}
		});
	}

	/// One drain cycle: send batches from the head until the queue is empty
	/// or a send fails.
	async fn drain(self: &Arc<Self>) {
		if self.queue.lock().await.is_empty() {
			return;
		}
		if self.draining.swap(true, Ordering::SeqCst) {
			return;
		}

		loop {
			let batch = self.queue.lock().await.take_batch(self.settings.batch_size);
			if batch.is_empty() {
				break;
			}

			let count = batch.len();
			match self.transport.send_batch(&batch).await {
				Ok(()) => {
					debug!(count, "log batch delivered");
					self.init_failures.store(0, Ordering::SeqCst);
				}
				Err(e) => {
					error!(error = %e, count, "failed to send log batch, requeueing");
					self.queue.lock().await.requeue_front(batch);
					break;
				}
			}
		}

		self.draining.store(false, Ordering::SeqCst);

		if !self.queue.lock().await.is_empty() {
			self.schedule_drain(self.settings.batch_timeout);
		}
	}

	fn spawn_drain(self: &Arc<Self>) {
		let inner = Arc::clone(self);
		tokio::spawn(async move {
			inner.drain().await;
		});
	}

	fn schedule_drain(self: &Arc<Self>, delay: Duration) {
		let inner = Arc::clone(self);
		tokio::spawn(async move {
			tokio::select! {
				_ = inner.cancel.cancelled() => {}
				_ = tokio::time::sleep(delay) => inner.drain().await,
			}
		});
	}

	fn arm_batch_timer(self: &Arc<Self>) {
		let inner = Arc::clone(self);
		tokio::spawn(async move {
			tokio::select! {
				_ = inner.cancel.cancelled() => {
					inner.timer_armed.store(false, Ordering::SeqCst);
				}
				_ = tokio::time::sleep(inner.settings.batch_timeout) => {
					// Cleared before draining so entries logged mid-drain arm a new timer
					inner.timer_armed.store(false, Ordering::SeqCst);
					inner.drain().await;
				}
			}
		});
	}
}

fn echo(entry: &LogEntry) {
	let source = entry.source.as_str();
	let data = &entry.data;
	match entry.level {
		LogLevel::Error => error!(target: "snaplink::remote", source, %data, "{}", entry.message),
		LogLevel::Warn => warn!(target: "snaplink::remote", source, %data, "{}", entry.message),
		LogLevel::Info => info!(target: "snaplink::remote", source, %data, "{}", entry.message),
		LogLevel::Debug => debug!(target: "snaplink::remote", source, %data, "{}", entry.message),
	}
}

/// Logger bound to a single source.
#[derive(Clone)]
pub struct ScopedLogger {
	logger: Logger,
	source: String,
}

impl ScopedLogger {
	pub fn source(&self) -> &str {
		&self.source
	}

	pub async fn error(&self, message: &str, data: Value) -> Result<()> {
		self.logger.error(&self.source, message, data).await
	}

	pub async fn warn(&self, message: &str, data: Value) -> Result<()> {
		self.logger.warn(&self.source, message, data).await
	}

	pub async fn info(&self, message: &str, data: Value) -> Result<()> {
		self.logger.info(&self.source, message, data).await
	}

	pub async fn debug(&self, message: &str, data: Value) -> Result<()> {
		self.logger.debug(&self.source, message, data).await
	}
}

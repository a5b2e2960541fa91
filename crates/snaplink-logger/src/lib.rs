// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batched remote logger.
//!
//! Entries are queued in memory and shipped to `POST /logs/batch` either when
//! the batch size is reached or after the batch timeout. Failed batches go
//! back to the head of the queue and are retried; nothing is dropped by a
//! send failure.
//!
//! ```ignore
//! use std::sync::Arc;
//! use snaplink_logger::{ApiTransport, Logger, LoggerSettings};
//!
//! let logger = Logger::new(
//!     LoggerSettings::from_config(&config),
//!     Arc::new(ApiTransport::new(api_client)),
//! );
//! logger.start().await;
//!
//! let log = logger.scoped("UrlForm");
//! log.info("URL shortened", serde_json::json!({ "shortCode": "abc123" })).await?;
//!
//! logger.shutdown().await;
//! ```

mod entry;
mod error;
mod logger;
mod queue;
mod transport;

pub use entry::{LogEntry, LogLevel};
pub use error::{LoggerError, Result};
pub use logger::{Logger, LoggerSettings, ScopedLogger, FLUSH_POLL_INTERVAL};
pub use queue::LogQueue;
pub use transport::{ApiTransport, LogTransport, BATCH_PATH, SINGLE_PATH};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of log entries to the remote endpoint.

use async_trait::async_trait;
use serde::Serialize;
use snaplink_api::ApiClient;
use tracing::debug;

use crate::entry::LogEntry;
use crate::error::Result;

pub const BATCH_PATH: &str = "/logs/batch";
pub const SINGLE_PATH: &str = "/logs";

/// Handler for shipping entries to the server.
#[async_trait]
pub trait LogTransport: Send + Sync {
	/// One-time handshake; returns whether the transport is ready.
	async fn initialize(&self) -> bool;

	async fn send_batch(&self, batch: &[LogEntry]) -> Result<()>;

	async fn send_entry(&self, entry: &LogEntry) -> Result<()>;
}

#[derive(Serialize)]
struct BatchPayload<'a> {
	logs: &'a [LogEntry],
}

/// [`LogTransport`] over the authenticated API client.
pub struct ApiTransport {
	client: ApiClient,
}

impl ApiTransport {
	pub fn new(client: ApiClient) -> Self {
		Self { client }
	}
}

#[async_trait]
impl LogTransport for ApiTransport {
	async fn initialize(&self) -> bool {
		self.client.tokens().initialize().await
	}

	async fn send_batch(&self, batch: &[LogEntry]) -> Result<()> {
		debug!(count = batch.len(), "sending log batch");
		self.client
			.post(BATCH_PATH, &BatchPayload { logs: batch })
			.await?;
		Ok(())
	}

	async fn send_entry(&self, entry: &LogEntry) -> Result<()> {
		self.client.post(SINGLE_PATH, entry).await?;
		Ok(())
	}
}

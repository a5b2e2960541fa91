// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wiring of the remote logger, API client and local store around a single
//! command invocation.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

use snaplink_api::{ApiClient, TokenProvider};
use snaplink_config::SnapLinkConfig;
use snaplink_logger::{ApiTransport, LogLevel, Logger, LoggerSettings};
use snaplink_store::Shortener;

use crate::output;
use crate::{Command, RemoteCommand};

pub struct App {
	api: ApiClient,
	logger: Logger,
	shortener: Shortener,
}

impl App {
	pub fn new(config: SnapLinkConfig) -> Result<Self> {
		let tokens = TokenProvider::new(&config.api, config.credentials.clone())
			.context("failed to create token provider")?;
		let api = ApiClient::new(config.api.clone(), Arc::new(tokens))
			.context("failed to create API client")?;

		let transport = Arc::new(ApiTransport::new(api.clone()));
		let logger = Logger::new(LoggerSettings::from_config(&config), transport);
		let shortener = Shortener::from_config(&config.store);

		Ok(Self {
			api,
			logger,
			shortener,
		})
	}

	pub async fn start(&self) {
		if !self.logger.start().await {
			warn!("remote logger not initialized, entries will be queued");
		}
	}

	/// Flushes pending entries. Returns how many could not be delivered.
	pub async fn shutdown(&self) -> usize {
		self.logger.shutdown().await
	}

	async fn record(&self, level: LogLevel, source: &str, message: &str, data: Value) {
		if let Err(e) = self.logger.log(level, source, message, data).await {
			debug!(error = %e, "remote log entry dropped");
		}
	}

	pub async fn report_failure(&self, source: &str, err: &anyhow::Error) {
		self.record(
			LogLevel::Error,
			source,
			"command failed",
			json!({ "error": format!("{err:#}") }),
		)
		.await;
	}

	pub async fn dispatch(&self, command: Command) -> Result<()> {
		match command {
			Command::Shorten {
				url,
				code,
				validity_minutes,
			} => {
				let record = self
					.shortener
					.shorten(&url, code.as_deref(), validity_minutes)
					.await
					.context("failed to shorten URL")?;

				self.record(
					LogLevel::Info,
					"shorten",
					"URL shortened",
					json!({
						"originalUrl": record.original_url,
						"shortCode": record.short_code,
						"expiresAt": record.expires_at,
					}),
				)
				.await;
				println!("{}", output::record_summary(&record));
			}
			Command::List => {
				let records = self
					.shortener
					.list()
					.await
					.context("failed to list URLs")?;

				self.record(
					LogLevel::Debug,
					"list",
					"listed URLs",
					json!({ "count": records.len() }),
				)
				.await;
				print!("{}", output::record_table(&records));
			}
			Command::Open { code } => {
				let record = self
					.shortener
					.resolve(&code)
					.await
					.context("Invalid or expired short URL")?;

				self.record(
					LogLevel::Info,
					"open",
					&format!("Redirecting to {}", record.original_url),
					json!({ "shortCode": code, "clicks": record.clicks }),
				)
				.await;
				println!("{}", record.original_url);
			}
			Command::Delete { code } => {
				self.shortener
					.delete(&code)
					.await
					.context("failed to delete URL")?;

				self.record(
					LogLevel::Info,
					"delete",
					"URL deleted",
					json!({ "shortCode": code }),
				)
				.await;
				println!("Deleted {code}");
			}
			Command::Remote { command } => {
				let response = self.remote(command).await?;
				println!("{}", serde_json::to_string_pretty(&response)?);
			}
			Command::Config => {}
		}
		Ok(())
	}

	async fn remote(&self, command: RemoteCommand) -> Result<Value> {
		let (action, code, response) = match command {
			RemoteCommand::Shorten { url, code } => {
				let response = self
					.api
					.shorten_url(&url, code.as_deref())
					.await
					.context("remote shorten failed")?;
				("shorten", code, response)
			}
			RemoteCommand::Details { code } => {
				let response = self
					.api
					.url_details(&code)
					.await
					.context("failed to fetch URL details")?;
				("details", Some(code), response)
			}
			RemoteCommand::Analytics { code } => {
				let response = self
					.api
					.analytics(&code)
					.await
					.context("failed to fetch analytics")?;
				("analytics", Some(code), response)
			}
		};

		self.record(
			LogLevel::Info,
			"remote",
			"remote call succeeded",
			json!({ "action": action, "shortCode": code }),
		)
		.await;
		Ok(response)
	}
}

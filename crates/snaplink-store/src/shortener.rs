// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use snaplink_config::StoreConfig;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::model::ShortenedUrlRecord;
use crate::shortcode::{generate_short_code, normalize_url, validate_short_code};
use crate::store::{LocalUrlStore, UrlStore};

const GENERATE_ATTEMPTS: usize = 5;

/// Shortening and resolution on top of a [`UrlStore`].
#[derive(Clone)]
pub struct Shortener {
	store: Arc<dyn UrlStore>,
	default_validity_minutes: u64,
	code_length: usize,
}

impl Shortener {
	pub fn new(store: Arc<dyn UrlStore>, default_validity_minutes: u64, code_length: usize) -> Self {
		Self {
			store,
			default_validity_minutes,
			code_length,
		}
	}

	/// Shortener over the JSON file named in `config`.
	pub fn from_config(config: &StoreConfig) -> Self {
		Self::new(
			Arc::new(LocalUrlStore::new(config.path.clone())),
			config.default_validity_minutes,
			config.short_code_length,
		)
	}

	pub fn store(&self) -> &Arc<dyn UrlStore> {
		&self.store
	}

	pub async fn shorten(
		&self,
		url: &str,
		custom_code: Option<&str>,
		validity_minutes: Option<u64>,
	) -> Result<ShortenedUrlRecord> {
		self.shorten_at(url, custom_code, validity_minutes, Utc::now())
			.await
	}

	pub async fn shorten_at(
		&self,
		url: &str,
		custom_code: Option<&str>,
		validity_minutes: Option<u64>,
		now: DateTime<Utc>,
	) -> Result<ShortenedUrlRecord> {
		let original_url = normalize_url(url)?;

		let minutes = validity_minutes.unwrap_or(self.default_validity_minutes);
		if minutes == 0 {
			return Err(StoreError::InvalidValidity);
		}
		let minutes = i64::try_from(minutes).map_err(|_| StoreError::InvalidValidity)?;
		let expires_at = Duration::try_minutes(minutes)
			.and_then(|d| now.checked_add_signed(d))
			.ok_or(StoreError::InvalidValidity)?;

		if let Some(code) = custom_code.filter(|c| !c.is_empty()) {
			validate_short_code(code)?;
			let record = ShortenedUrlRecord::new(original_url, code, now, Some(expires_at));
			self.store.insert(record.clone()).await?;
			return Ok(record);
		}

		let mut last_code = String::new();
		for attempt in 1..=GENERATE_ATTEMPTS {
			let code = generate_short_code(self.code_length);
			let record = ShortenedUrlRecord::new(original_url.clone(), code, now, Some(expires_at));
			match self.store.insert(record.clone()).await {
				Ok(()) => return Ok(record),
				Err(StoreError::DuplicateCode(code)) => {
					debug!(short_code = %code, attempt, "generated code collided, retrying");
					last_code = code;
				}
				Err(e) => return Err(e),
			}
		}

		warn!(attempts = GENERATE_ATTEMPTS, "could not generate a unique short code");
		Err(StoreError::DuplicateCode(last_code))
	}

	/// Looks up `code`, counts the visit, and returns the updated record.
	pub async fn resolve(&self, code: &str) -> Result<ShortenedUrlRecord> {
		self.resolve_at(code, Utc::now()).await
	}

	pub async fn resolve_at(&self, code: &str, now: DateTime<Utc>) -> Result<ShortenedUrlRecord> {
		let record = self
			.store
			.get(code)
			.await?
			.ok_or_else(|| StoreError::NotFound(code.to_string()))?;

		if record.is_expired_at(now) {
			return Err(StoreError::Expired(code.to_string()));
		}

		self.store.record_click(code, now).await
	}

	pub async fn list(&self) -> Result<Vec<ShortenedUrlRecord>> {
		self.store.active(Utc::now()).await
	}

	pub async fn delete(&self, code: &str) -> Result<ShortenedUrlRecord> {
		self.store.remove(code).await
	}
}

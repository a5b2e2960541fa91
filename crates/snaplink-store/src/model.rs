// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A long URL mapped to a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedUrlRecord {
	pub original_url: String,
	pub short_code: String,
	pub created_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub clicks: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_clicked_at: Option<DateTime<Utc>>,
}

impl ShortenedUrlRecord {
	pub fn new(
		original_url: impl Into<String>,
		short_code: impl Into<String>,
		created_at: DateTime<Utc>,
		expires_at: Option<DateTime<Utc>>,
	) -> Self {
		Self {
			original_url: original_url.into(),
			short_code: short_code.into(),
			created_at,
			expires_at,
			clicks: 0,
			last_clicked_at: None,
		}
	}

	/// A record without an expiry never expires.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at.is_some_and(|at| at <= now)
	}

	pub fn record_click(&mut self, at: DateTime<Utc>) {
		self.clicks += 1;
		self.last_clicked_at = Some(at);
	}
}

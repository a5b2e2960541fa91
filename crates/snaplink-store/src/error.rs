// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Please enter a valid URL")]
	InvalidUrl(String),

	#[error("invalid short code '{code}': {reason}")]
	InvalidShortCode { code: String, reason: &'static str },

	#[error("short code already in use: {0}")]
	DuplicateCode(String),

	#[error("validity must be at least one minute")]
	InvalidValidity,

	#[error("short URL not found: {0}")]
	NotFound(String),

	#[error("short URL has expired: {0}")]
	Expired(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Short-code generation and URL normalization.

use url::Url;

use crate::error::{Result, StoreError};

pub use snaplink_config::validation::MAX_SHORT_CODE_LENGTH;

pub const DEFAULT_SHORT_CODE_LENGTH: usize = 6;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 code of `length` characters.
pub fn generate_short_code(length: usize) -> String {
	(0..length)
		.map(|_| ALPHABET[fastrand::usize(..ALPHABET.len())] as char)
		.collect()
}

/// Custom codes may only contain ASCII letters, digits and hyphens.
pub fn validate_short_code(code: &str) -> Result<()> {
	let invalid = |reason| StoreError::InvalidShortCode {
		code: code.to_string(),
		reason,
	};

	if code.is_empty() {
		return Err(invalid("must not be empty"));
	}
	if code.len() > MAX_SHORT_CODE_LENGTH {
		return Err(invalid("too long"));
	}
	if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
		return Err(invalid("only letters, numbers, and hyphens are allowed"));
	}
	Ok(())
}

/// Prefixes `https://` when the input has no http(s) scheme, then checks that
/// the result parses as an absolute URL.
pub fn normalize_url(input: &str) -> Result<String> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(StoreError::InvalidUrl(input.to_string()));
	}

	let lower = trimmed.to_ascii_lowercase();
	let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
		trimmed.to_string()
	} else {
		format!("https://{trimmed}")
	};

	match Url::parse(&candidate) {
		Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(candidate),
		_ => Err(StoreError::InvalidUrl(input.to_string())),
	}
}

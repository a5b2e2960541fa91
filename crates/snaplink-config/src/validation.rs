// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use tracing::warn;
use url::Url;

use crate::runtime::SnapLinkConfig;
use crate::ConfigError;

/// Longest short code the store will generate.
pub const MAX_SHORT_CODE_LENGTH: usize = 32;

/// Validate the configuration.
pub fn validate_config(config: &SnapLinkConfig) -> Result<(), ConfigError> {
	validate_api(config)?;
	validate_credentials(config);
	validate_logger(config)?;
	validate_store(config)?;

	Ok(())
}

fn validate_api(config: &SnapLinkConfig) -> Result<(), ConfigError> {
	let api = &config.api;

	let url = Url::parse(&api.base_url).map_err(|e| {
		ConfigError::invalid_value("api.base_url", format!("not a valid URL: {e}"))
	})?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::invalid_value(
			"api.base_url",
			format!("unsupported scheme '{}'", url.scheme()),
		));
	}

	if api.timeout.is_zero() {
		return Err(ConfigError::invalid_value(
			"api.timeout_secs",
			"must be greater than 0",
		));
	}

	if !api.auth_path.starts_with('/') {
		return Err(ConfigError::invalid_value(
			"api.auth_path",
			"must start with '/'",
		));
	}

	Ok(())
}

fn validate_credentials(config: &SnapLinkConfig) {
	let creds = &config.credentials;
	// Missing credentials only matter once the remote API is used
	if creds.client_id.is_empty() || creds.client_secret.is_empty() {
		warn!("no client credentials configured, remote calls will fail to authenticate");
	}
}

fn validate_logger(config: &SnapLinkConfig) -> Result<(), ConfigError> {
	let logger = &config.logger;

	if logger.batch_size == 0 {
		return Err(ConfigError::invalid_value(
			"logger.batch_size",
			"must be at least 1",
		));
	}

	if logger.batch_timeout.is_zero() {
		return Err(ConfigError::invalid_value(
			"logger.batch_timeout_ms",
			"must be greater than 0",
		));
	}

	if logger.retry_delay.is_zero() {
		return Err(ConfigError::invalid_value(
			"logger.retry_delay_ms",
			"must be greater than 0",
		));
	}

	if logger.shutdown_timeout.is_zero() {
		return Err(ConfigError::invalid_value(
			"logger.shutdown_timeout_ms",
			"must be greater than 0",
		));
	}

	Ok(())
}

fn validate_store(config: &SnapLinkConfig) -> Result<(), ConfigError> {
	let store = &config.store;

	if store.default_validity_minutes == 0 {
		return Err(ConfigError::invalid_value(
			"store.default_validity_minutes",
			"must be greater than 0",
		));
	}

	if store.short_code_length == 0 || store.short_code_length > MAX_SHORT_CODE_LENGTH {
		return Err(ConfigError::invalid_value(
			"store.short_code_length",
			format!("must be between 1 and {MAX_SHORT_CODE_LENGTH}"),
		));
	}

	Ok(())
}

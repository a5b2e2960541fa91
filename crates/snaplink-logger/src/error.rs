// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the remote logger.

use snaplink_api::ApiError;
use snaplink_common_http::RetryableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
	/// The logger no longer accepts entries.
	#[error("logger has been shut down")]
	Shutdown,

	/// Delivery to the log endpoint failed.
	#[error("failed to deliver logs: {0}")]
	Transport(#[from] ApiError),
}

impl RetryableError for LoggerError {
	fn is_retryable(&self) -> bool {
		// Every delivery failure is retried up to the configured limit
		matches!(self, LoggerError::Transport(_))
	}
}

pub type Result<T> = std::result::Result<T, LoggerError>;

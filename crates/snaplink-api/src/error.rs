// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure to obtain a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
	#[error("Authentication failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("Authentication failed: {message}")]
	Rejected { status: u16, message: String },

	#[error("Authentication failed: no access token received in response")]
	MissingToken,
}

/// Request-level failure from [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
	/// The server answered with a non-2xx status.
	#[error("{message}")]
	Response {
		status: u16,
		message: String,
		data: Value,
	},

	#[error("No response from server - Please check your connection")]
	NoResponse(#[source] reqwest::Error),

	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error("failed to encode request body: {0}")]
	Encode(#[source] serde_json::Error),

	#[error("failed to build HTTP client: {0}")]
	Client(#[source] reqwest::Error),
}

impl ApiError {
	/// Builds a response error, preferring the server's `message` field.
	pub fn from_response(status: u16, data: Value) -> Self {
		let message = data
			.get("message")
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| default_message(status).to_string());

		Self::Response {
			status,
			message,
			data,
		}
	}

	/// HTTP status, absent when no response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Response { status, .. } => Some(*status),
			Self::Auth(AuthError::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// User-facing message.
	pub fn message(&self) -> String {
		self.to_string()
	}

	/// Response body sent by the server, if any.
	pub fn raw_data(&self) -> Option<&Value> {
		match self {
			Self::Response { data, .. } => Some(data),
			_ => None,
		}
	}
}

fn default_message(status: u16) -> &'static str {
	match status {
		401 => "Unauthorized - Please log in again",
		403 => "Forbidden - You do not have permission to perform this action",
		404 => "Resource not found",
		s if s >= 500 => "Server error - Please try again later",
		_ => "An error occurred",
	}
}

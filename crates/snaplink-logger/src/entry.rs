// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a remote log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
}

impl LogLevel {
	/// Lower is more severe.
	fn rank(self) -> u8 {
		match self {
			LogLevel::Error => 0,
			LogLevel::Warn => 1,
			LogLevel::Info => 2,
			LogLevel::Debug => 3,
		}
	}

	/// Whether an entry at this level passes a `threshold` filter.
	pub fn is_enabled(self, threshold: LogLevel) -> bool {
		self.rank() <= threshold.rank()
	}

	pub fn as_str(self) -> &'static str {
		match self {
			LogLevel::Error => "ERROR",
			LogLevel::Warn => "WARN",
			LogLevel::Info => "INFO",
			LogLevel::Debug => "DEBUG",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A structured entry as shipped to the log endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
	/// ISO-8601 UTC timestamp with millisecond precision.
	pub timestamp: String,
	pub level: LogLevel,
	pub source: String,
	pub message: String,
	pub data: Value,
	pub environment: String,
	pub version: String,
}

impl LogEntry {
	pub fn new(
		level: LogLevel,
		source: impl Into<String>,
		message: impl Into<String>,
		data: Value,
		environment: impl Into<String>,
		version: impl Into<String>,
	) -> Self {
		Self {
			timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
			level,
			source: source.into(),
			message: message.into(),
			data,
			environment: environment.into(),
			version: version.into(),
		}
	}
}

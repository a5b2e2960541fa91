// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::secret::SecretString;
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/evaluation-service";
pub const DEFAULT_AUTH_PATH: &str = "/auth";
pub const DEFAULT_APP_NAME: &str = "SnapLink";

/// The final, validated configuration for SnapLink.
#[derive(Debug, Clone, Serialize)]
pub struct SnapLinkConfig {
	pub api: ApiConfig,
	pub credentials: Credentials,
	pub app: AppConfig,
	pub logger: LoggerConfig,
	pub logging: LoggingConfig,
	pub store: StoreConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
	pub base_url: String,
	#[serde(rename = "timeout_secs", with = "secs_serde")]
	pub timeout: Duration,
	pub auth_path: String,
}

impl ApiConfig {
	/// Join a request path onto the base URL.
	pub fn endpoint(&self, path: &str) -> String {
		format!(
			"{}/{}",
			self.base_url.trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			timeout: Duration::from_secs(10),
			auth_path: DEFAULT_AUTH_PATH.to_string(),
		}
	}
}

/// Fixed credential set posted to the auth endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
	pub email: String,
	pub name: String,
	pub roll_no: String,
	pub access_code: SecretString,
	pub client_id: String,
	pub client_secret: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Development,
	Production,
	Test,
}

impl Environment {
	pub fn as_str(&self) -> &'static str {
		match self {
			Environment::Development => "development",
			Environment::Production => "production",
			Environment::Test => "test",
		}
	}

	pub fn is_production(&self) -> bool {
		matches!(self, Environment::Production)
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Environment {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Environment::Development),
			"production" | "prod" => Ok(Environment::Production),
			"test" => Ok(Environment::Test),
			other => Err(ConfigError::invalid_value(
				"app.environment",
				format!("unknown environment '{other}'"),
			)),
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
	pub name: String,
	pub version: String,
	pub environment: Environment,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			name: DEFAULT_APP_NAME.to_string(),
			version: env!("CARGO_PKG_VERSION").to_string(),
			environment: Environment::default(),
		}
	}
}

/// Tuning for the remote log batching queue.
#[derive(Debug, Clone, Serialize)]
pub struct LoggerConfig {
	pub batch_size: usize,
	#[serde(rename = "batch_timeout_ms", with = "millis_serde")]
	pub batch_timeout: Duration,
	#[serde(rename = "retry_delay_ms", with = "millis_serde")]
	pub retry_delay: Duration,
	pub max_retries: u32,
	#[serde(rename = "shutdown_timeout_ms", with = "millis_serde")]
	pub shutdown_timeout: Duration,
}

impl Default for LoggerConfig {
	fn default() -> Self {
		Self {
			batch_size: 10,
			batch_timeout: Duration::from_millis(2000),
			retry_delay: Duration::from_millis(1000),
			max_retries: 3,
			shutdown_timeout: Duration::from_millis(1000),
		}
	}
}

mod millis_serde {
	use serde::Serializer;
	use std::time::Duration;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(duration.as_millis() as u64)
	}
}

mod secs_serde {
	use serde::Serializer;
	use std::time::Duration;

	pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(duration.as_secs())
	}
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	/// Directive understood by `tracing_subscriber::EnvFilter`.
	pub fn as_filter(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreConfig {
	pub path: PathBuf,
	pub default_validity_minutes: u64,
	pub short_code_length: usize,
}

impl SnapLinkConfig {
	/// Build runtime config from a merged layer and paths.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let api = build_api_config(layer.api);
		let credentials = build_credentials(layer.credentials);
		let app = build_app_config(layer.app)?;
		let logger = build_logger_config(layer.logger);
		let logging = build_logging_config(layer.logging);
		let store = build_store_config(layer.store, &paths);

		Ok(Self {
			api,
			credentials,
			app,
			logger,
			logging,
			store,
			paths,
		})
	}
}

fn build_api_config(layer: Option<ApiLayer>) -> ApiConfig {
	let layer = layer.unwrap_or_default();
	ApiConfig {
		base_url: layer
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
		timeout: Duration::from_secs(layer.timeout_secs.unwrap_or(10)),
		auth_path: layer
			.auth_path
			.unwrap_or_else(|| DEFAULT_AUTH_PATH.to_string()),
	}
}

fn build_credentials(layer: Option<CredentialsLayer>) -> Credentials {
	let layer = layer.unwrap_or_default();
	Credentials {
		email: layer.email.unwrap_or_default(),
		name: layer.name.unwrap_or_default(),
		roll_no: layer.roll_no.unwrap_or_default(),
		access_code: layer.access_code.unwrap_or_default(),
		client_id: layer.client_id.unwrap_or_default(),
		client_secret: layer.client_secret.unwrap_or_default(),
	}
}

fn build_app_config(layer: Option<AppLayer>) -> Result<AppConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let environment = match layer.environment.as_deref() {
		Some(env) => env.parse()?,
		None => Environment::default(),
	};

	Ok(AppConfig {
		name: layer
			.name
			.unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
		version: layer
			.version
			.unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
		environment,
	})
}

fn build_logger_config(layer: Option<LoggerLayer>) -> LoggerConfig {
	let layer = layer.unwrap_or_default();
	let defaults = LoggerConfig::default();
	LoggerConfig {
		batch_size: layer.batch_size.unwrap_or(defaults.batch_size),
		batch_timeout: layer
			.batch_timeout_ms
			.map(Duration::from_millis)
			.unwrap_or(defaults.batch_timeout),
		retry_delay: layer
			.retry_delay_ms
			.map(Duration::from_millis)
			.unwrap_or(defaults.retry_delay),
		max_retries: layer.max_retries.unwrap_or(defaults.max_retries),
		shutdown_timeout: layer
			.shutdown_timeout_ms
			.map(Duration::from_millis)
			.unwrap_or(defaults.shutdown_timeout),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> LoggingConfig {
	let layer = layer.unwrap_or_default();
	LoggingConfig {
		level: parse_log_level(layer.level.as_deref()),
		format: parse_log_format(layer.format.as_deref()),
	}
}

fn parse_log_level(s: Option<&str>) -> LogLevel {
	match s {
		Some("error") => LogLevel::Error,
		Some("warn") => LogLevel::Warn,
		Some("info") => LogLevel::Info,
		Some("debug") => LogLevel::Debug,
		Some("trace") => LogLevel::Trace,
		_ => LogLevel::Info,
	}
}

fn parse_log_format(s: Option<&str>) -> LogFormat {
	match s {
		Some("json") => LogFormat::Json,
		Some("compact") => LogFormat::Compact,
		Some("pretty") => LogFormat::Pretty,
		_ => LogFormat::Pretty,
	}
}

fn build_store_config(layer: Option<StoreLayer>, paths: &PathsConfig) -> StoreConfig {
	let layer = layer.unwrap_or_default();
	StoreConfig {
		path: layer.path.unwrap_or_else(|| paths.default_store_file()),
		default_validity_minutes: layer.default_validity_minutes.unwrap_or(30),
		short_code_length: layer.short_code_length.unwrap_or(6),
	}
}

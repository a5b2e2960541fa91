// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::env::load_secret_env;
use crate::layer::*;
use crate::paths::{PathsConfig, SYSTEM_CONFIG_FILE};
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied when the runtime config is built
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
}

impl FileSource {
	/// System config: /etc/snaplink/config.toml
	pub fn system() -> Self {
		Self {
			path: PathBuf::from(SYSTEM_CONFIG_FILE),
			precedence: Precedence::SystemFile,
			name: "system-config",
		}
	}

	/// User config: ~/.config/snaplink/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
		}
	}

	/// Custom file path with specified precedence
	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `SNAPLINK_<FIELD>`. Credential secrets also accept the
/// `SNAPLINK_<FIELD>_FILE` form.
pub struct EnvSource;

const SECRET_VARS: [&str; 2] = ["SNAPLINK_ACCESS_CODE", "SNAPLINK_CLIENT_SECRET"];

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let mut layer = ConfigLayer::default();

		if let Some(secret) = load_secret_env("SNAPLINK_ACCESS_CODE")? {
			trace!("loaded access code from environment");
			credentials(&mut layer).access_code = Some(secret);
		}

		if let Some(secret) = load_secret_env("SNAPLINK_CLIENT_SECRET")? {
			trace!("loaded client secret from environment");
			credentials(&mut layer).client_secret = Some(secret);
		}

		for (key, value) in std::env::vars() {
			if !key.starts_with("SNAPLINK_") || SECRET_VARS.contains(&key.as_str()) {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key.as_str() {
				"SNAPLINK_API_BASE_URL" => {
					layer.api.get_or_insert_with(ApiLayer::default).base_url = Some(value);
				}
				"SNAPLINK_API_TIMEOUT_SECS" => {
					if let Some(v) = parse_number(&key, &value) {
						layer.api.get_or_insert_with(ApiLayer::default).timeout_secs = Some(v);
					}
				}

				"SNAPLINK_EMAIL" => credentials(&mut layer).email = Some(value),
				"SNAPLINK_NAME" => credentials(&mut layer).name = Some(value),
				"SNAPLINK_ROLL_NO" => credentials(&mut layer).roll_no = Some(value),
				"SNAPLINK_CLIENT_ID" => credentials(&mut layer).client_id = Some(value),

				"SNAPLINK_ENVIRONMENT" => {
					layer.app.get_or_insert_with(AppLayer::default).environment = Some(value);
				}

				"SNAPLINK_LOGGER_BATCH_SIZE" => {
					if let Some(v) = parse_number(&key, &value) {
						layer
							.logger
							.get_or_insert_with(LoggerLayer::default)
							.batch_size = Some(v);
					}
				}
				"SNAPLINK_LOGGER_BATCH_TIMEOUT_MS" => {
					if let Some(v) = parse_number(&key, &value) {
						layer
							.logger
							.get_or_insert_with(LoggerLayer::default)
							.batch_timeout_ms = Some(v);
					}
				}

				"SNAPLINK_LOG_LEVEL" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.level = Some(value);
				}
				"SNAPLINK_LOG_FORMAT" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.format = Some(value);
				}

				"SNAPLINK_STORE_PATH" => {
					layer.store.get_or_insert_with(StoreLayer::default).path =
						Some(PathBuf::from(value));
				}

				_ => {}
			}
		}

		Ok(layer)
	}
}

fn credentials(layer: &mut ConfigLayer) -> &mut CredentialsLayer {
	layer
		.credentials
		.get_or_insert_with(CredentialsLayer::default)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
	match value.parse() {
		Ok(v) => Some(v),
		Err(_) => {
			warn!(key = %key, value = %value, "ignoring non-numeric environment value");
			None
		}
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub base_url: Option<String>,
	pub environment: Option<String>,
	pub store_path: Option<PathBuf>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let mut layer = ConfigLayer::default();

		if let Some(ref base_url) = self.overrides.base_url {
			layer.api.get_or_insert_with(ApiLayer::default).base_url = Some(base_url.clone());
		}

		if let Some(ref environment) = self.overrides.environment {
			layer.app.get_or_insert_with(AppLayer::default).environment =
				Some(environment.clone());
		}

		if let Some(ref path) = self.overrides.store_path {
			layer.store.get_or_insert_with(StoreLayer::default).path = Some(path.clone());
		}

		if let Some(ref level) = self.overrides.log_level {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.level = Some(level.clone());
		}

		if let Some(ref format) = self.overrides.log_format {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.format = Some(format.clone());
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::SystemFile);
		assert!(Precedence::SystemFile > Precedence::Defaults);
	}

	#[test]
	fn defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.api.is_none());
		assert!(layer.credentials.is_none());
	}

	#[test]
	fn missing_file_returns_empty_layer() {
		let source = FileSource::custom(
			PathBuf::from("/nonexistent/snaplink/config.toml"),
			Precedence::UserFile,
			"test",
		);
		let layer = source.load().unwrap();
		assert!(layer.api.is_none());
	}

	#[test]
	fn malformed_file_is_a_parse_error() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[api\nbase_url = ").unwrap();

		let source = FileSource::custom(file.path().to_path_buf(), Precedence::UserFile, "test");
		assert!(matches!(
			source.load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn cli_overrides_populate_layer() {
		let source = CliSource::new(CliOverrides {
			base_url: Some("http://cli.example".to_string()),
			environment: Some("production".to_string()),
			log_level: Some("debug".to_string()),
			..Default::default()
		});

		let layer = source.load().unwrap();
		assert_eq!(
			layer.api.unwrap().base_url.as_deref(),
			Some("http://cli.example")
		);
		assert_eq!(
			layer.app.unwrap().environment.as_deref(),
			Some("production")
		);
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
		assert!(layer.store.is_none());
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for SnapLink.
//!
//! This crate provides:
//! - [`Secret<T>`] for credentials and tokens that must never be logged
//! - [`load_secret_env`] for `VAR` / `VAR_FILE` secret loading
//! - Layered configuration: defaults, TOML files, environment, CLI overrides
//! - Validation of the merged result into a [`SnapLinkConfig`]

pub mod env;
pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod secret;
pub mod sources;
pub mod validation;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{
	ApiConfig, AppConfig, Credentials, Environment, LogFormat, LogLevel, LoggerConfig,
	LoggingConfig, SnapLinkConfig, StoreConfig,
};
pub use secret::{Secret, SecretString, REDACTED};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from defaults, config files and the environment.
pub fn load_config() -> Result<SnapLinkConfig, ConfigError> {
	load_config_with_cli(CliOverrides::default())
}

/// Load configuration with CLI overrides applied last.
///
/// An explicit `config_file` in the overrides is read in place of the user
/// config file.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<SnapLinkConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system()));
	match cli.config_file.clone() {
		Some(path) => registry.register(Box::new(sources::FileSource::custom(
			path,
			Precedence::UserFile,
			"cli-config-file",
		))),
		None => registry.register(Box::new(sources::FileSource::user(&paths))),
	}
	registry.register(Box::new(sources::EnvSource));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}

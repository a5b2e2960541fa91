// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

/// Resolved XDG paths for SnapLink.
#[derive(Debug, Clone)]
pub struct PathsConfig {
	/// User config file: ~/.config/snaplink/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/snaplink/config.toml
	pub system_config_file: PathBuf,
	/// Data directory: ~/.local/share/snaplink/
	pub data_dir: PathBuf,
}

impl PathsConfig {
	/// Default location of the local URL store.
	pub fn default_store_file(&self) -> PathBuf {
		self.data_dir.join("urls.json")
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/snaplink/config.toml"),
			system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
			data_dir: PathBuf::from("~/.local/share/snaplink"),
		}
	}
}

pub const SYSTEM_CONFIG_FILE: &str = "/etc/snaplink/config.toml";

/// Resolve paths from `XDG_CONFIG_HOME` / `XDG_DATA_HOME`, falling back to
/// `~/.config` and `~/.local/share`.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".config"));

	let data_home = std::env::var_os("XDG_DATA_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".local/share"));

	tracing::debug!(
		config_home = %config_home.display(),
		data_home = %data_home.display(),
		"resolved XDG paths"
	);

	Ok(PathsConfig {
		user_config_file: config_home.join("snaplink/config.toml"),
		system_config_file: PathBuf::from(SYSTEM_CONFIG_FILE),
		data_dir: data_home.join("snaplink"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolved_paths_are_namespaced() {
		let paths = resolve_xdg_paths().unwrap();
		assert!(paths.user_config_file.ends_with("snaplink/config.toml"));
		assert!(paths.data_dir.ends_with("snaplink"));
		assert_eq!(paths.system_config_file, PathBuf::from(SYSTEM_CONFIG_FILE));
	}

	#[test]
	fn store_file_lives_in_data_dir() {
		let paths = PathsConfig::default();
		assert_eq!(
			paths.default_store_file(),
			PathBuf::from("~/.local/share/snaplink/urls.json")
		);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

use crate::secret::SecretString;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub api: Option<ApiLayer>,
	#[serde(default)]
	pub credentials: Option<CredentialsLayer>,
	#[serde(default)]
	pub app: Option<AppLayer>,
	#[serde(default)]
	pub logger: Option<LoggerLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
	#[serde(default)]
	pub store: Option<StoreLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub auth_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsLayer {
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub roll_no: Option<String>,
	#[serde(default)]
	pub access_code: Option<SecretString>,
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub client_secret: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppLayer {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggerLayer {
	#[serde(default)]
	pub batch_size: Option<usize>,
	#[serde(default)]
	pub batch_timeout_ms: Option<u64>,
	#[serde(default)]
	pub retry_delay_ms: Option<u64>,
	#[serde(default)]
	pub max_retries: Option<u32>,
	#[serde(default)]
	pub shutdown_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreLayer {
	#[serde(default)]
	pub path: Option<PathBuf>,
	#[serde(default)]
	pub default_validity_minutes: Option<u64>,
	#[serde(default)]
	pub short_code_length: Option<usize>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.api, other.api, ApiLayer::merge);
		merge_option(
			&mut self.credentials,
			other.credentials,
			CredentialsLayer::merge,
		);
		merge_option(&mut self.app, other.app, AppLayer::merge);
		merge_option(&mut self.logger, other.logger, LoggerLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
		merge_option(&mut self.store, other.store, StoreLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn overwrite<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl ApiLayer {
	fn merge(&mut self, other: ApiLayer) {
		overwrite(&mut self.base_url, other.base_url);
		overwrite(&mut self.timeout_secs, other.timeout_secs);
		overwrite(&mut self.auth_path, other.auth_path);
	}
}

impl CredentialsLayer {
	fn merge(&mut self, other: CredentialsLayer) {
		overwrite(&mut self.email, other.email);
		overwrite(&mut self.name, other.name);
		overwrite(&mut self.roll_no, other.roll_no);
		overwrite(&mut self.access_code, other.access_code);
		overwrite(&mut self.client_id, other.client_id);
		overwrite(&mut self.client_secret, other.client_secret);
	}
}

impl AppLayer {
	fn merge(&mut self, other: AppLayer) {
		overwrite(&mut self.name, other.name);
		overwrite(&mut self.version, other.version);
		overwrite(&mut self.environment, other.environment);
	}
}

impl LoggerLayer {
	fn merge(&mut self, other: LoggerLayer) {
		overwrite(&mut self.batch_size, other.batch_size);
		overwrite(&mut self.batch_timeout_ms, other.batch_timeout_ms);
		overwrite(&mut self.retry_delay_ms, other.retry_delay_ms);
		overwrite(&mut self.max_retries, other.max_retries);
		overwrite(&mut self.shutdown_timeout_ms, other.shutdown_timeout_ms);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		overwrite(&mut self.level, other.level);
		overwrite(&mut self.format, other.format);
	}
}

impl StoreLayer {
	fn merge(&mut self, other: StoreLayer) {
		overwrite(&mut self.path, other.path);
		overwrite(
			&mut self.default_validity_minutes,
			other.default_validity_minutes,
		);
		overwrite(&mut self.short_code_length, other.short_code_length);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn later_layer_overwrites_set_fields_only() {
		let mut base = ConfigLayer {
			api: Some(ApiLayer {
				base_url: Some("http://base.example".to_string()),
				timeout_secs: Some(5),
				auth_path: None,
			}),
			..Default::default()
		};

		let overlay = ConfigLayer {
			api: Some(ApiLayer {
				base_url: Some("http://overlay.example".to_string()),
				timeout_secs: None,
				auth_path: None,
			}),
			..Default::default()
		};

		base.merge(overlay);

		let api = base.api.unwrap();
		assert_eq!(api.base_url.as_deref(), Some("http://overlay.example"));
		assert_eq!(api.timeout_secs, Some(5));
	}

	#[test]
	fn missing_section_is_taken_from_overlay() {
		let mut base = ConfigLayer::default();
		let overlay = ConfigLayer {
			logger: Some(LoggerLayer {
				batch_size: Some(25),
				..Default::default()
			}),
			..Default::default()
		};

		base.merge(overlay);
		assert_eq!(base.logger.unwrap().batch_size, Some(25));
	}

	#[test]
	fn credentials_merge_keeps_secrets_from_lower_layer() {
		let mut base = ConfigLayer {
			credentials: Some(CredentialsLayer {
				client_secret: Some(SecretString::from("from-file")),
				..Default::default()
			}),
			..Default::default()
		};
		let overlay = ConfigLayer {
			credentials: Some(CredentialsLayer {
				email: Some("dev@example.com".to_string()),
				..Default::default()
			}),
			..Default::default()
		};

		base.merge(overlay);

		let creds = base.credentials.unwrap();
		assert_eq!(creds.email.as_deref(), Some("dev@example.com"));
		assert_eq!(creds.client_secret.unwrap().expose(), "from-file");
	}

	#[test]
	fn parses_toml_sections() {
		let layer: ConfigLayer = toml::from_str(
			r#"
[api]
base_url = "http://snaplink.test/api"

[logger]
batch_size = 5
batch_timeout_ms = 500

[store]
short_code_length = 8
"#,
		)
		.unwrap();

		assert_eq!(
			layer.api.unwrap().base_url.as_deref(),
			Some("http://snaplink.test/api")
		);
		let logger = layer.logger.unwrap();
		assert_eq!(logger.batch_size, Some(5));
		assert_eq!(logger.batch_timeout_ms, Some(500));
		assert_eq!(layer.store.unwrap().short_code_length, Some(8));
	}

	#[test]
	fn debug_output_redacts_credentials() {
		let layer = CredentialsLayer {
			access_code: Some(SecretString::from("abc123")),
			..Default::default()
		};
		let debug = format!("{layer:?}");
		assert!(!debug.contains("abc123"));
		assert!(debug.contains("[REDACTED]"));
	}
}

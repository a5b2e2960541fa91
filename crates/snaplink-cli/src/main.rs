// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SnapLink CLI
//!
//! Shortens URLs into a local store, resolves short codes, talks to the
//! remote shortening service, and ships a structured log entry for every
//! action to the remote log endpoint.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snaplink_config::{load_config_with_cli, CliOverrides, LogFormat, LoggingConfig};

mod app;
mod output;

use app::App;

/// SnapLink - shorten, track and resolve URLs
#[derive(Parser, Debug)]
#[command(name = "snaplink", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Base URL of the evaluation service (overrides config)
	#[arg(long)]
	base_url: Option<String>,

	/// Deployment environment: development, production or test
	#[arg(short, long)]
	environment: Option<String>,

	/// Path of the local URL store file
	#[arg(long)]
	store: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Shorten a URL into the local store
	Shorten {
		/// URL to shorten; `https://` is added when no scheme is given
		url: String,
		/// Custom short code (letters, numbers and hyphens)
		#[arg(long, short = 'c')]
		code: Option<String>,
		/// Minutes until the short URL expires
		#[arg(long, short = 'm')]
		validity_minutes: Option<u64>,
	},
	/// List unexpired short URLs
	List,
	/// Resolve a short code to its original URL and count the visit
	#[command(alias = "resolve")]
	Open {
		/// Short code to resolve
		code: String,
	},
	/// Delete a short URL
	Delete {
		/// Short code to delete
		code: String,
	},
	/// Call the remote shortening service
	Remote {
		#[command(subcommand)]
		command: RemoteCommand,
	},
	/// Print the effective configuration
	Config,
}

#[derive(Subcommand, Debug)]
enum RemoteCommand {
	/// Create a short URL on the server
	Shorten {
		/// URL to shorten
		url: String,
		/// Custom short code
		#[arg(long, short = 'c')]
		code: Option<String>,
	},
	/// Fetch details of a short URL
	Details {
		/// Short code to look up
		code: String,
	},
	/// Fetch click analytics of a short URL
	Analytics {
		/// Short code to look up
		code: String,
	},
}

impl Command {
	/// Source name attached to remote log entries for this command.
	fn source(&self) -> &'static str {
		match self {
			Command::Shorten { .. } => "shorten",
			Command::List => "list",
			Command::Open { .. } => "open",
			Command::Delete { .. } => "delete",
			Command::Remote { .. } => "remote",
			Command::Config => "config",
		}
	}
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			base_url: args.base_url.clone(),
			environment: args.environment.clone(),
			store_path: args.store.clone(),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			config_file: args.config.clone(),
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"snaplink={level},snaplink_api={level},snaplink_logger={level},snaplink_store={level}",
			level = logging.level.as_filter()
		))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	match run(args).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::FAILURE
		}
	}
}

async fn run(args: Args) -> Result<()> {
	let config =
		load_config_with_cli(CliOverrides::from(&args)).context("failed to load configuration")?;

	init_tracing(&config.logging);

	// Printing config needs neither the network nor the store.
	if let Command::Config = args.command {
		let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
		print!("{rendered}");
		return Ok(());
	}

	info!(
		environment = %config.app.environment,
		base_url = %config.api.base_url,
		"starting snaplink"
	);

	let app = App::new(config).context("failed to initialize")?;
	app.start().await;

	let source = args.command.source();
	let result = app.dispatch(args.command).await;
	if let Err(err) = &result {
		app.report_failure(source, err).await;
	}

	let undelivered = app.shutdown().await;
	debug!(undelivered, "exiting");

	result
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_shorten_with_options() {
		let args = Args::try_parse_from([
			"snaplink",
			"shorten",
			"example.com",
			"--code",
			"ex",
			"--validity-minutes",
			"5",
		])
		.unwrap();

		match args.command {
			Command::Shorten {
				url,
				code,
				validity_minutes,
			} => {
				assert_eq!(url, "example.com");
				assert_eq!(code.as_deref(), Some("ex"));
				assert_eq!(validity_minutes, Some(5));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn resolve_is_an_alias_for_open() {
		let args = Args::try_parse_from(["snaplink", "resolve", "abc"]).unwrap();
		assert!(matches!(args.command, Command::Open { code } if code == "abc"));
	}

	#[test]
	fn parses_remote_subcommands() {
		let args = Args::try_parse_from(["snaplink", "remote", "analytics", "abc"]).unwrap();
		assert!(matches!(
			args.command,
			Command::Remote {
				command: RemoteCommand::Analytics { code }
			} if code == "abc"
		));
	}

	#[test]
	fn global_flags_map_to_overrides() {
		let args = Args::try_parse_from([
			"snaplink",
			"--base-url",
			"http://api.test",
			"--environment",
			"production",
			"--store",
			"/tmp/urls.json",
			"--json-logs",
			"list",
		])
		.unwrap();

		let overrides = CliOverrides::from(&args);
		assert_eq!(overrides.base_url.as_deref(), Some("http://api.test"));
		assert_eq!(overrides.environment.as_deref(), Some("production"));
		assert_eq!(overrides.store_path, Some(PathBuf::from("/tmp/urls.json")));
		assert_eq!(overrides.log_format.as_deref(), Some("json"));
		assert!(overrides.log_level.is_none());
		assert!(overrides.config_file.is_none());
	}

	#[test]
	fn command_is_required() {
		assert!(Args::try_parse_from(["snaplink"]).is_err());
	}
}

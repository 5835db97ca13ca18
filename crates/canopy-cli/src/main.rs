// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canopy CLI - host for the client identity and locale core.
//!
//! Loads layered configuration, builds the identity and locale services
//! once, and runs a single command against the persistent store.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use canopy_client_config::{
	load_config_with_cli,
	runtime::{LogFormat, LogLevel, LoggingConfig},
	CliOverrides,
};

mod app;
mod commands;

use app::App;

/// Canopy - visitor identity and language preference
#[derive(Parser, Debug)]
#[command(name = "canopy", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Store file holding the visitor ID and language preference
	#[arg(long)]
	store: Option<PathBuf>,

	/// Keep everything in memory for this run only
	#[arg(long, conflicts_with = "store")]
	memory_store: bool,

	/// Language tag to use instead of the system language (e.g. mr-IN)
	#[arg(long)]
	language: Option<String>,

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
	/// Print the visitor ID, creating it on first use
	VisitorId {
		/// Only print an ID that already exists
		#[arg(long)]
		existing: bool,
	},
	/// Show or change the language
	Locale {
		#[command(subcommand)]
		command: LocaleCommand,
	},
	/// Translate a message key in the current language
	Translate {
		/// Message key (e.g. client.visitor.label)
		key: String,
		/// Placeholder value (repeatable: --arg NAME=VALUE)
		#[arg(long = "arg", value_name = "NAME=VALUE", value_parser = parse_key_val)]
		args: Vec<(String, String)>,
	},
	/// Run the startup sequence and summarise the session
	Session {
		/// Output as JSON
		#[arg(long)]
		json: bool,
	},
	/// Forget the stored visitor ID and language preference
	Reset,
}

#[derive(Subcommand, Debug)]
enum LocaleCommand {
	/// Print the language in effect
	Show,
	/// Switch to another supported language
	Set {
		/// Language code (e.g. hi)
		code: String,
	},
	/// List supported languages
	List,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			config_file: args.config.clone(),
			store_path: args.store.clone(),
			memory_store: args.memory_store,
			language: args.language.clone(),
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
		}
	}
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
	let (name, value) = s
		.split_once('=')
		.ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
	if name.is_empty() {
		return Err(format!("missing name in '{s}'"));
	}
	Ok((name.to_string(), value.to_string()))
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!("canopy={}", log_level_to_tracing(logging.level)))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(io::stderr))
				.init();
		}
	}
}

fn main() -> Result<()> {
	let args = Args::parse();

	let cli_overrides = CliOverrides::from(&args);
	let config = load_config_with_cli(cli_overrides).context("failed to load configuration")?;

	init_tracing(&config.logging);

	info!(
		backend = ?config.storage.backend,
		store = %config.storage.path.display(),
		"starting canopy"
	);

	let app = App::new(&config)?;
	let mut out = io::stdout().lock();

	match &args.command {
		Command::VisitorId { existing } => commands::visitor_id(&app, *existing, &mut out),
		Command::Locale { command } => match command {
			LocaleCommand::Show => commands::locale_show(&app, &mut out),
			LocaleCommand::Set { code } => commands::locale_set(&app, code, &mut out),
			LocaleCommand::List => commands::locale_list(&app, &mut out),
		},
		Command::Translate { key, args } => commands::translate(&app, key, args, &mut out),
		Command::Session { json } => commands::session(&app, *json, &mut out),
		Command::Reset => commands::reset(&app, &mut out),
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::*;
use crate::paths::PathsConfig;
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
		// Return empty layer - defaults applied during finalization
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
	/// System config: /etc/canopy/config.toml
	pub fn system() -> Self {
		Self {
			path: PathBuf::from("/etc/canopy/config.toml"),
			precedence: Precedence::SystemFile,
			name: "system-config",
		}
	}

	/// User config: ~/.config/canopy/config.toml
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
			debug!(
				path = %self.path.display(),
				source = self.name,
				"config file not found, skipping"
			);
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
/// Convention: CANOPY_<FIELD>; list values are comma-separated.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(layer_from_vars(std::env::vars()))
	}
}

pub(crate) fn layer_from_vars<I>(vars: I) -> ConfigLayer
where
	I: IntoIterator<Item = (String, String)>,
{
	let mut layer = ConfigLayer::default();

	for (key, value) in vars {
		if !key.starts_with("CANOPY_") {
			continue;
		}

		let value = value.trim().to_string();
		if value.is_empty() {
			continue;
		}

		trace!(key = %key, "processing env var");

		match key.as_str() {
			// Storage
			"CANOPY_STORAGE_BACKEND" => {
				layer
					.storage
					.get_or_insert_with(StorageLayer::default)
					.backend = Some(value);
			}
			"CANOPY_STORE_PATH" => {
				layer.storage.get_or_insert_with(StorageLayer::default).path =
					Some(PathBuf::from(value));
			}

			// Locale
			"CANOPY_SUPPORTED_LOCALES" => {
				let codes = value
					.split(',')
					.map(str::trim)
					.filter(|c| !c.is_empty())
					.map(str::to_string)
					.collect();
				layer.locale.get_or_insert_with(LocaleLayer::default).supported = Some(codes);
			}
			"CANOPY_DEFAULT_LOCALE" => {
				layer.locale.get_or_insert_with(LocaleLayer::default).default = Some(value);
			}
			"CANOPY_LOCALE_KEY" => {
				layer
					.locale
					.get_or_insert_with(LocaleLayer::default)
					.preference_key = Some(value);
			}
			"CANOPY_LANGUAGE" => {
				layer
					.locale
					.get_or_insert_with(LocaleLayer::default)
					.language_override = Some(value);
			}

			// Logging
			"CANOPY_LOG_LEVEL" => {
				layer
					.logging
					.get_or_insert_with(LoggingLayer::default)
					.level = Some(value);
			}
			"CANOPY_LOG_FORMAT" => {
				layer
					.logging
					.get_or_insert_with(LoggingLayer::default)
					.format = Some(value);
			}

			_ => {
				// Unknown CANOPY_ variable, ignore
			}
		}
	}

	layer
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub config_file: Option<PathBuf>,
	pub store_path: Option<PathBuf>,
	pub memory_store: bool,
	pub language: Option<String>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
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

		if let Some(ref path) = self.overrides.store_path {
			layer.storage.get_or_insert_with(StorageLayer::default).path = Some(path.clone());
		}

		if self.overrides.memory_store {
			layer
				.storage
				.get_or_insert_with(StorageLayer::default)
				.backend = Some("memory".to_string());
		}

		if let Some(ref language) = self.overrides.language {
			layer
				.locale
				.get_or_insert_with(LocaleLayer::default)
				.language_override = Some(language.clone());
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

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the Canopy client core.
//!
//! This crate provides:
//! - XDG Base Directory compliant path resolution
//! - Layered configuration from multiple sources
//! - TOML configuration file parsing
//! - Environment variable overrides
//! - Configuration validation

pub mod defaults;
pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

pub use defaults::{ensure_default_config, DEFAULT_CONFIG_TEMPLATE};
pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{CanopyConfig, LogFormat, LogLevel, StorageBackend};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with default precedence.
///
/// If no user config file exists, a default one is created at
/// `~/.config/canopy/config.toml`.
pub fn load_config() -> Result<CanopyConfig, ConfigError> {
	load_config_with_cli(CliOverrides::default())
}

/// Load configuration with CLI overrides.
///
/// An explicit `--config` file replaces the user config file and is never
/// auto-created.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<CanopyConfig, ConfigError> {
	let paths = paths::resolve_xdg_paths()?;

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::system()));

	match cli.config_file.clone() {
		Some(path) => {
			registry.register(Box::new(sources::FileSource::custom(
				path,
				Precedence::UserFile,
				"cli-config-file",
			)));
		}
		None => {
			defaults::ensure_default_config(&paths.user_config_file)?;
			registry.register(Box::new(sources::FileSource::user(&paths)));
		}
	}

	registry.register(Box::new(sources::EnvSource));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}

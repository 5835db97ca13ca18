// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

/// Resolved XDG paths for Canopy.
#[derive(Debug, Clone)]
pub struct PathsConfig {
	/// User config file: ~/.config/canopy/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/canopy/config.toml
	pub system_config_file: PathBuf,
	/// State directory: ~/.local/state/canopy/
	pub state_dir: PathBuf,
}

impl PathsConfig {
	/// Default location of the client storage scope.
	pub fn default_store_file(&self) -> PathBuf {
		self.state_dir.join("store.json")
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/canopy/config.toml"),
			system_config_file: PathBuf::from("/etc/canopy/config.toml"),
			state_dir: PathBuf::from("~/.local/state/canopy"),
		}
	}
}

/// Resolve XDG paths according to the Base Directory Specification.
///
/// Uses environment variables if set, otherwise falls back to defaults:
/// - XDG_CONFIG_HOME or ~/.config
/// - XDG_STATE_HOME or ~/.local/state
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".config"));

	let state_home = std::env::var_os("XDG_STATE_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".local/state"));

	tracing::debug!(
		config_home = %config_home.display(),
		state_home = %state_home.display(),
		"resolved XDG paths"
	);

	Ok(PathsConfig {
		user_config_file: config_home.join("canopy/config.toml"),
		system_config_file: PathBuf::from("/etc/canopy/config.toml"),
		state_dir: state_home.join("canopy"),
	})
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Default configuration file generation.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::ConfigError;

/// Default configuration file template.
///
/// This template is written to ~/.config/canopy/config.toml when no user config exists.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"#
# Canopy Client Configuration File
# Location: ~/.config/canopy/config.toml
#
# This file was auto-generated with sensible defaults.
#

# =============================================================================
# Storage
# =============================================================================

[storage]
# Backend: "file" keeps the visitor id and language across runs,
# "memory" forgets them when the process exits.
backend = "file"

# Store file location (defaults to ~/.local/state/canopy/store.json)
# path = "/path/to/store.json"

# =============================================================================
# Locale
# =============================================================================

[locale]
# Languages users may choose from. Each must have a translation bundle.
supported = ["en", "hi", "mr"]

# Used when neither a stored preference nor the system language matches.
default = "en"

# Storage key for the chosen language.
preference_key = "canopy-language"

# Replace the language reported by the operating system (e.g. "mr-IN").
# language_override = "mr-IN"

# =============================================================================
# Logging Configuration
# =============================================================================

[logging]
# Log level: error, warn, info, debug, trace
level = "warn"

# Log format: pretty, json, compact
format = "compact"
"#;

/// Ensure the config directory exists and create a default config file if none exists.
///
/// Returns `true` if a new config file was created, `false` if one already existed.
pub fn ensure_default_config(config_file_path: &Path) -> Result<bool, ConfigError> {
	if config_file_path.exists() {
		debug!(path = %config_file_path.display(), "config file already exists");
		return Ok(false);
	}

	if let Some(parent) = config_file_path.parent() {
		if !parent.exists() {
			debug!(path = %parent.display(), "creating config directory");
			fs::create_dir_all(parent)?;
		}
	}

	info!(path = %config_file_path.display(), "creating default config file");
	fs::write(config_file_path, DEFAULT_CONFIG_TEMPLATE)?;

	Ok(true)
}

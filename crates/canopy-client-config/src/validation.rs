// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use canopy_client_identity::VISITOR_ID_KEY;
use canopy_common_i18n::is_supported;
use tracing::warn;

use crate::runtime::{CanopyConfig, StorageBackend};
use crate::ConfigError;

/// Validate the configuration.
///
/// Returns Ok(()) if valid, or a ConfigError describing the first problem.
pub fn validate_config(config: &CanopyConfig) -> Result<(), ConfigError> {
	validate_locale(config)?;
	validate_storage(config)?;

	Ok(())
}

fn validate_locale(config: &CanopyConfig) -> Result<(), ConfigError> {
	let locale = &config.locale;

	if locale.supported.is_empty() {
		return Err(ConfigError::invalid_value(
			"locale.supported",
			"at least one locale must be supported",
		));
	}

	if let Some(unknown) = locale.supported.iter().find(|code| !is_supported(code)) {
		return Err(ConfigError::invalid_value(
			"locale.supported",
			format!("'{unknown}' has no translation bundle"),
		));
	}

	if !locale.supported.contains(&locale.default) {
		return Err(ConfigError::invalid_value(
			"locale.default",
			format!("'{}' is not in locale.supported", locale.default),
		));
	}

	if locale.preference_key.trim().is_empty() {
		return Err(ConfigError::invalid_value(
			"locale.preference_key",
			"preference key cannot be empty",
		));
	}

	if locale.preference_key == VISITOR_ID_KEY {
		return Err(ConfigError::validation(format!(
			"locale.preference_key cannot be '{VISITOR_ID_KEY}', it is reserved for the visitor id"
		)));
	}

	Ok(())
}

fn validate_storage(config: &CanopyConfig) -> Result<(), ConfigError> {
	if config.storage.backend == StorageBackend::Memory {
		warn!("memory storage backend configured; visitor id and language will not persist");
		return Ok(());
	}

	if config.storage.path.as_os_str().is_empty() {
		return Err(ConfigError::invalid_value(
			"storage.path",
			"path cannot be empty for the file backend",
		));
	}

	Ok(())
}

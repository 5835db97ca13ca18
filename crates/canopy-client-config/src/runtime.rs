// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use canopy_client_locale::{SupportedLocales, DEFAULT_PREFERENCE_KEY};
use canopy_common_i18n::{DEFAULT_LOCALE, LOCALES};

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// The final, validated configuration for the Canopy client core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanopyConfig {
	pub storage: StorageConfig,
	pub locale: LocaleConfig,
	pub logging: LoggingConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
	pub backend: StorageBackend,
	pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	#[default]
	File,
	Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
	pub supported: Vec<String>,
	pub default: String,
	pub preference_key: String,
	pub language_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Pretty,
	Json,
	#[default]
	Compact,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: LogLevel::default(),
			format: LogFormat::default(),
		}
	}
}

impl Default for LocaleConfig {
	fn default() -> Self {
		Self {
			supported: LOCALES.iter().map(|l| l.code.to_string()).collect(),
			default: DEFAULT_LOCALE.to_string(),
			preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
			language_override: None,
		}
	}
}

impl LocaleConfig {
	/// Build the validated supported set for the locale policy.
	pub fn supported_locales(&self) -> Result<SupportedLocales, ConfigError> {
		SupportedLocales::new(self.supported.iter().cloned(), self.default.clone())
			.map_err(|e| ConfigError::invalid_value("locale.supported", e.to_string()))
	}
}

impl CanopyConfig {
	/// Build runtime config from a merged layer and paths.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let storage = build_storage_config(layer.storage, &paths)?;
		let locale = build_locale_config(layer.locale);
		let logging = build_logging_config(layer.logging);

		Ok(Self {
			storage,
			locale,
			logging,
			paths,
		})
	}
}

fn build_storage_config(
	layer: Option<StorageLayer>,
	paths: &PathsConfig,
) -> Result<StorageConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let backend = match layer.backend.as_deref() {
		None | Some("file") => StorageBackend::File,
		Some("memory") => StorageBackend::Memory,
		Some(other) => {
			return Err(ConfigError::invalid_value(
				"storage.backend",
				format!("unknown backend '{other}' (expected 'file' or 'memory')"),
			))
		}
	};

	Ok(StorageConfig {
		backend,
		path: layer.path.unwrap_or_else(|| paths.default_store_file()),
	})
}

fn build_locale_config(layer: Option<LocaleLayer>) -> LocaleConfig {
	let layer = layer.unwrap_or_default();
	let defaults = LocaleConfig::default();
	LocaleConfig {
		supported: layer.supported.unwrap_or(defaults.supported),
		default: layer.default.unwrap_or(defaults.default),
		preference_key: layer.preference_key.unwrap_or(defaults.preference_key),
		language_override: layer.language_override,
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> LoggingConfig {
	let layer = layer.unwrap_or_default();
	LoggingConfig {
		level: parse_log_level(layer.level.as_deref()),
		format: parse_log_format(layer.format.as_deref()),
	}
}

fn parse_log_level(s: Option<&str>) -> LogLevel {
	match s {
		Some("error") => LogLevel::Error,
		Some("warn") => LogLevel::Warn,
		Some("info") => LogLevel::Info,
		Some("debug") => LogLevel::Debug,
		Some("trace") => LogLevel::Trace,
		_ => LogLevel::default(),
	}
}

fn parse_log_format(s: Option<&str>) -> LogFormat {
	match s {
		Some("json") => LogFormat::Json,
		Some("compact") => LogFormat::Compact,
		Some("pretty") => LogFormat::Pretty,
		_ => LogFormat::default(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_from_empty_layer() {
		let config =
			CanopyConfig::from_layer(ConfigLayer::default(), PathsConfig::default()).unwrap();

		assert_eq!(config.storage.backend, StorageBackend::File);
		assert_eq!(config.storage.path, PathsConfig::default().default_store_file());
		assert_eq!(config.locale.supported, vec!["en", "hi", "mr"]);
		assert_eq!(config.locale.default, "en");
		assert_eq!(config.locale.preference_key, "canopy-language");
		assert_eq!(config.logging.level, LogLevel::Warn);
		assert_eq!(config.logging.format, LogFormat::Compact);
	}

	#[test]
	fn test_unknown_backend_rejected() {
		let layer = ConfigLayer {
			storage: Some(StorageLayer {
				backend: Some("indexeddb".to_string()),
				path: None,
			}),
			..Default::default()
		};
		let err = CanopyConfig::from_layer(layer, PathsConfig::default()).unwrap_err();
		assert!(
			matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "storage.backend")
		);
	}

	#[test]
	fn test_unknown_log_values_fall_back() {
		assert_eq!(parse_log_level(Some("loud")), LogLevel::Warn);
		assert_eq!(parse_log_format(Some("xml")), LogFormat::Compact);
		assert_eq!(parse_log_level(Some("debug")), LogLevel::Debug);
	}

	#[test]
	fn test_supported_locales_from_config() {
		let config = LocaleConfig {
			supported: vec!["hi".into(), "mr".into()],
			default: "mr".into(),
			..Default::default()
		};
		let supported = config.supported_locales().unwrap();
		assert_eq!(supported.default_code(), "mr");

		let bad = LocaleConfig {
			supported: vec!["hi".into()],
			default: "en".into(),
			..Default::default()
		};
		assert!(bad.supported_locales().is_err());
	}
}

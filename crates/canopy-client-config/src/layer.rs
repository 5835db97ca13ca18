// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub storage: Option<StorageLayer>,
	#[serde(default)]
	pub locale: Option<LocaleLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageLayer {
	/// "file" or "memory"
	#[serde(default)]
	pub backend: Option<String>,
	#[serde(default)]
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleLayer {
	#[serde(default)]
	pub supported: Option<Vec<String>>,
	#[serde(default)]
	pub default: Option<String>,
	#[serde(default)]
	pub preference_key: Option<String>,
	/// Replaces the platform-reported language.
	#[serde(default)]
	pub language_override: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.storage, other.storage, StorageLayer::merge);
		merge_option(&mut self.locale, other.locale, LocaleLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
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

impl StorageLayer {
	fn merge(&mut self, other: StorageLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.path.is_some() {
			self.path = other.path;
		}
	}
}

impl LocaleLayer {
	fn merge(&mut self, other: LocaleLayer) {
		if other.supported.is_some() {
			self.supported = other.supported;
		}
		if other.default.is_some() {
			self.default = other.default;
		}
		if other.preference_key.is_some() {
			self.preference_key = other.preference_key;
		}
		if other.language_override.is_some() {
			self.language_override = other.language_override;
		}
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

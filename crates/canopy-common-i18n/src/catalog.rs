// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation bundle loading and translation functions.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::locale::{locale_info, LocaleInfo, DEFAULT_LOCALE};

const EN_TOML: &str = include_str!("../locales/en.toml");
const HI_TOML: &str = include_str!("../locales/hi.toml");
const MR_TOML: &str = include_str!("../locales/mr.toml");

/// Errors raised while parsing a translation bundle.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
	#[error("locale '{0}' is not registered")]
	UnknownLocale(String),

	#[error("invalid bundle for locale '{locale}': {source}")]
	InvalidBundle {
		locale: String,
		#[source]
		source: toml::de::Error,
	},
}

/// The translated strings for one locale.
#[derive(Debug, Clone)]
pub struct LocaleBundle {
	info: &'static LocaleInfo,
	messages: HashMap<String, String>,
}

impl LocaleBundle {
	/// Parse a bundle from its TOML source.
	///
	/// The source is a flat table of quoted dot-notation keys to strings.
	pub fn parse(code: &str, source: &str) -> Result<Self, I18nError> {
		let info = locale_info(code).ok_or_else(|| I18nError::UnknownLocale(code.to_string()))?;
		let messages: HashMap<String, String> =
			toml::from_str(source).map_err(|e| I18nError::InvalidBundle {
				locale: code.to_string(),
				source: e,
			})?;
		Ok(Self { info, messages })
	}

	/// Locale metadata for this bundle.
	pub fn info(&self) -> &'static LocaleInfo {
		self.info
	}

	/// Look up a message without any fallback.
	pub fn get(&self, msgid: &str) -> Option<&str> {
		self.messages.get(msgid).map(String::as_str)
	}

	/// Number of messages in the bundle.
	pub fn len(&self) -> usize {
		self.messages.len()
	}

	/// Returns true if the bundle has no messages.
	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}
}

static BUNDLES: Lazy<HashMap<&'static str, LocaleBundle>> = Lazy::new(|| {
	let mut map = HashMap::new();

	for (code, source) in [("en", EN_TOML), ("hi", HI_TOML), ("mr", MR_TOML)] {
		match LocaleBundle::parse(code, source) {
			Ok(bundle) => {
				map.insert(code, bundle);
			}
			Err(e) if code == DEFAULT_LOCALE => {
				tracing::error!(
					locale = code,
					error = %e,
					"Failed to parse default translation bundle"
				);
			}
			Err(e) => {
				tracing::warn!(locale = code, error = %e, "Failed to parse translation bundle");
			}
		}
	}

	map
});

/// Get the bundle for a locale, if one is registered.
pub fn bundle(locale: &str) -> Option<&'static LocaleBundle> {
	BUNDLES.get(locale)
}

/// Translate a string for the given locale.
///
/// Falls back to English if the translation is not found, then to the msgid itself.
///
/// # Example
///
/// ```
/// use canopy_common_i18n::t;
///
/// assert_eq!(t("en", "client.visitor.label"), "Visitor ID");
/// assert_eq!(t("en", "client.missing.key"), "client.missing.key");
/// ```
pub fn t(locale: &str, msgid: &str) -> String {
	if let Some(translated) = bundle(locale).and_then(|b| b.get(msgid)) {
		return translated.to_string();
	}

	if locale != DEFAULT_LOCALE {
		if let Some(translated) = bundle(DEFAULT_LOCALE).and_then(|b| b.get(msgid)) {
			return translated.to_string();
		}
	}

	msgid.to_string()
}

/// Translate a string with variable substitution.
///
/// Variables use `{name}` syntax in the translated string.
///
/// # Example
///
/// ```
/// use canopy_common_i18n::t_fmt;
///
/// let msg = t_fmt("en", "client.locale.changed", &[("locale", "Hindi")]);
/// assert_eq!(msg, "Language changed to Hindi");
/// ```
pub fn t_fmt(locale: &str, msgid: &str, args: &[(&str, &str)]) -> String {
	let mut result = t(locale, msgid);
	for (name, value) in args {
		result = result.replace(&format!("{{{name}}}"), value);
	}
	result
}

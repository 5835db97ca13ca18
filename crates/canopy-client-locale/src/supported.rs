// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use canopy_common_i18n::{DEFAULT_LOCALE, LOCALES};

use crate::error::LocaleError;

/// A closed set of locale codes together with the fallback code.
///
/// The default is guaranteed to be a member of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
	codes: Vec<String>,
	default: String,
}

impl SupportedLocales {
	/// Build a supported set. Duplicate codes are dropped, first occurrence
	/// order is kept.
	pub fn new<I, S>(codes: I, default: impl Into<String>) -> Result<Self, LocaleError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut unique: Vec<String> = Vec::new();
		for code in codes {
			let code = code.into();
			if !unique.contains(&code) {
				unique.push(code);
			}
		}

		if unique.is_empty() {
			return Err(LocaleError::EmptySupportedSet);
		}

		let default = default.into();
		if !unique.contains(&default) {
			return Err(LocaleError::DefaultNotSupported { default });
		}

		Ok(Self {
			codes: unique,
			default,
		})
	}

	pub fn contains(&self, code: &str) -> bool {
		self.codes.iter().any(|c| c == code)
	}

	pub fn codes(&self) -> &[String] {
		&self.codes
	}

	pub fn default_code(&self) -> &str {
		&self.default
	}
}

/// Every locale in the i18n registry, defaulting to English.
impl Default for SupportedLocales {
	fn default() -> Self {
		Self {
			codes: LOCALES.iter().map(|l| l.code.to_string()).collect(),
			default: DEFAULT_LOCALE.to_string(),
		}
	}
}

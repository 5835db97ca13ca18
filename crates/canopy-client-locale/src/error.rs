// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale error types.

use canopy_common_storage::StorageError;

/// Errors that can occur while configuring or changing the active locale.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
	/// The requested code is outside the supported set.
	#[error("unsupported locale '{code}' (supported: {})", .supported.join(", "))]
	UnsupportedLocale { code: String, supported: Vec<String> },

	/// The preference could not be persisted.
	#[error("locale preference storage unavailable: {0}")]
	StorageUnavailable(#[from] StorageError),

	/// A supported set was built without any codes.
	#[error("supported locale set is empty")]
	EmptySupportedSet,

	/// The default code is not in the supported set.
	#[error("default locale '{default}' is not in the supported set")]
	DefaultNotSupported { default: String },
}

impl LocaleError {
	pub fn unsupported(code: impl Into<String>, supported: &[String]) -> Self {
		Self::UnsupportedLocale {
			code: code.into(),
			supported: supported.to_vec(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unsupported_message_lists_supported() {
		let err = LocaleError::unsupported("fr", &["en".to_string(), "hi".to_string()]);
		assert_eq!(err.to_string(), "unsupported locale 'fr' (supported: en, hi)");
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ambient language signal: what the platform says the user's language is.

/// Read-only source of the platform-reported language tag.
///
/// The returned tag is unvalidated and may be in any format (`mr-IN`,
/// `hi_IN.UTF-8`, ...).
pub trait LanguageSignal: Send + Sync + std::fmt::Debug {
	fn read(&self) -> Option<String>;
}

/// Language signal backed by the operating system locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLanguageSignal;

impl LanguageSignal for SystemLanguageSignal {
	fn read(&self) -> Option<String> {
		let locale = sys_locale::get_locale();
		tracing::trace!(locale = ?locale, "read system locale");
		locale
	}
}

/// Language signal that always reports the same tag.
///
/// Used for configured overrides and in tests.
#[derive(Debug, Default, Clone)]
pub struct FixedLanguageSignal(Option<String>);

impl FixedLanguageSignal {
	pub fn new(tag: impl Into<String>) -> Self {
		Self(Some(tag.into()))
	}

	/// A signal that reports nothing.
	pub fn none() -> Self {
		Self(None)
	}
}

impl LanguageSignal for FixedLanguageSignal {
	fn read(&self) -> Option<String> {
		self.0.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_signal() {
		assert_eq!(FixedLanguageSignal::new("mr-IN").read().as_deref(), Some("mr-IN"));
		assert_eq!(FixedLanguageSignal::none().read(), None);
	}

	#[test]
	fn test_system_signal_does_not_panic() {
		let _ = SystemLanguageSignal.read();
	}
}

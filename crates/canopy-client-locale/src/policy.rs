// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Active locale policy.

use std::sync::{Arc, Mutex, MutexGuard};

use canopy_common_i18n::{bundle, primary_subtag, resolve_locale, LocaleBundle};
use canopy_common_storage::KeyValueStore;
use tracing::{debug, warn};

use crate::document::{DocumentAttributes, DocumentLanguage};
use crate::error::LocaleError;
use crate::notifier::{LanguageChangeNotifier, Subscription};
use crate::signal::{LanguageSignal, SystemLanguageSignal};
use crate::supported::SupportedLocales;

/// Storage key for the persisted language preference.
pub const DEFAULT_PREFERENCE_KEY: &str = "canopy-language";

/// Lifecycle of the active locale within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleState {
	/// Nothing resolved yet.
	Uninitialized,
	/// Starting locale picked by [`LocalePolicy::resolve_initial`].
	Resolved(String),
	/// Locale explicitly changed and persisted during this session.
	Active(String),
}

impl LocaleState {
	pub fn code(&self) -> Option<&str> {
		match self {
			LocaleState::Uninitialized => None,
			LocaleState::Resolved(code) | LocaleState::Active(code) => Some(code.as_str()),
		}
	}
}

/// Resolves the session's starting locale and persists later changes.
///
/// The policy is an explicitly constructed service: the application root
/// owns it (usually behind an `Arc`) and hands it to whoever needs it.
#[derive(Debug)]
pub struct LocalePolicy {
	store: Arc<dyn KeyValueStore>,
	signal: Arc<dyn LanguageSignal>,
	document: Arc<dyn DocumentLanguage>,
	supported: SupportedLocales,
	preference_key: String,
	state: Mutex<LocaleState>,
}

impl LocalePolicy {
	/// Create a policy reading the system language and writing to a private
	/// [`DocumentAttributes`].
	pub fn new(store: Arc<dyn KeyValueStore>, supported: SupportedLocales) -> Self {
		Self {
			store,
			signal: Arc::new(SystemLanguageSignal),
			document: Arc::new(DocumentAttributes::new()),
			supported,
			preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
			state: Mutex::new(LocaleState::Uninitialized),
		}
	}

	/// Sets the ambient language signal (builder pattern).
	pub fn with_signal(mut self, signal: Arc<dyn LanguageSignal>) -> Self {
		self.signal = signal;
		self
	}

	/// Sets the document language target (builder pattern).
	pub fn with_document(mut self, document: Arc<dyn DocumentLanguage>) -> Self {
		self.document = document;
		self
	}

	/// Sets the storage key for the preference (builder pattern).
	pub fn with_preference_key(mut self, key: impl Into<String>) -> Self {
		self.preference_key = key.into();
		self
	}

	pub fn supported(&self) -> &SupportedLocales {
		&self.supported
	}

	pub fn preference_key(&self) -> &str {
		&self.preference_key
	}

	fn state_guard(&self) -> MutexGuard<'_, LocaleState> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn state(&self) -> LocaleState {
		self.state_guard().clone()
	}

	/// The locale currently in effect, once resolved.
	pub fn active(&self) -> Option<String> {
		self.state_guard().code().map(str::to_string)
	}

	/// Translation bundle for the locale currently in effect.
	pub fn active_bundle(&self) -> Option<&'static LocaleBundle> {
		self.active().and_then(|code| bundle(&code))
	}

	/// Pick the starting locale for the session.
	///
	/// Resolution order (first match wins):
	/// 1. The persisted preference, if it is supported
	/// 2. The primary subtag of the ambient language signal, if supported
	/// 3. The default code
	///
	/// Never writes. A storage read failure is logged and treated as "no
	/// persisted preference".
	pub fn resolve_initial(&self) -> String {
		let persisted = match self.store.get(&self.preference_key) {
			Ok(value) => value,
			Err(e) => {
				warn!(
					key = %self.preference_key,
					error = %e,
					"failed to read locale preference, ignoring it"
				);
				None
			}
		};
		let ambient = self.signal.read();
		let ambient_primary = ambient.as_deref().and_then(primary_subtag);

		let code = resolve_locale(
			[persisted.as_deref(), ambient_primary.as_deref()],
			self.supported.codes(),
			self.supported.default_code(),
		);

		debug!(
			persisted = ?persisted,
			ambient = ?ambient,
			resolved = %code,
			"resolved initial locale"
		);

		let mut state = self.state_guard();
		if !matches!(*state, LocaleState::Active(_)) {
			*state = LocaleState::Resolved(code.clone());
		}

		code
	}

	/// Make `code` the active locale.
	///
	/// Persists the preference and then updates the document language, both
	/// before returning. No lock is held while the store and the document are
	/// called, so a document implementation may query the policy; it still
	/// observes the previous locale until `apply` returns.
	///
	/// # Errors
	///
	/// - [`LocaleError::UnsupportedLocale`] if `code` is not supported;
	///   nothing is written and the previous locale stays in effect.
	/// - [`LocaleError::StorageUnavailable`] if the preference cannot be
	///   written; the document is left untouched.
	pub fn apply(&self, code: &str) -> Result<(), LocaleError> {
		if !self.supported.contains(code) {
			warn!(locale = %code, "rejected unsupported locale");
			return Err(LocaleError::unsupported(code, self.supported.codes()));
		}

		self.store.set(&self.preference_key, code)?;
		self.document.set(code);
		*self.state_guard() = LocaleState::Active(code.to_string());

		debug!(locale = %code, key = %self.preference_key, "locale preference persisted");
		Ok(())
	}

	/// Apply every locale published on `notifier`.
	///
	/// The handler holds a weak reference; once the policy is dropped,
	/// notifications are ignored.
	pub fn on_change(self: &Arc<Self>, notifier: &LanguageChangeNotifier) -> Subscription {
		let policy = Arc::downgrade(self);
		notifier.subscribe(move |code| match policy.upgrade() {
			Some(policy) => policy.apply(code),
			None => Ok(()),
		})
	}
}

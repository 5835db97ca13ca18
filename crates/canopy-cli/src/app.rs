// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application root: builds every service once and hands out references.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use canopy_client_config::{CanopyConfig, StorageBackend};
use canopy_client_identity::IdentityStore;
use canopy_client_locale::{
	DocumentAttributes, FixedLanguageSignal, LanguageChangeNotifier, LanguageSignal, LocalePolicy,
	Subscription, SystemLanguageSignal,
};
use canopy_common_storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

pub struct App {
	store: Arc<dyn KeyValueStore>,
	identity: IdentityStore,
	policy: Arc<LocalePolicy>,
	document: Arc<DocumentAttributes>,
	notifier: LanguageChangeNotifier,
	_locale_subscription: Subscription,
}

impl App {
	/// Build the services over the storage backend named in `config`.
	pub fn new(config: &CanopyConfig) -> Result<Self> {
		let store: Arc<dyn KeyValueStore> = match config.storage.backend {
			StorageBackend::File => Arc::new(FileKeyValueStore::new(&config.storage.path)),
			StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
		};
		debug!(
			backend = ?config.storage.backend,
			path = %config.storage.path.display(),
			"opened store"
		);
		Self::with_store(config, store)
	}

	/// Build the services over an existing store.
	pub fn with_store(config: &CanopyConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
		let supported = config
			.locale
			.supported_locales()
			.context("invalid locale configuration")?;

		let signal: Arc<dyn LanguageSignal> = match &config.locale.language_override {
			Some(tag) => Arc::new(FixedLanguageSignal::new(tag.clone())),
			None => Arc::new(SystemLanguageSignal),
		};

		let document = Arc::new(DocumentAttributes::new());
		let policy = Arc::new(
			LocalePolicy::new(store.clone(), supported)
				.with_signal(signal)
				.with_document(document.clone())
				.with_preference_key(config.locale.preference_key.clone()),
		);

		let notifier = LanguageChangeNotifier::new();
		let subscription = policy.on_change(&notifier);

		Ok(Self {
			identity: IdentityStore::new(store.clone()),
			store,
			policy,
			document,
			notifier,
			_locale_subscription: subscription,
		})
	}

	pub fn store(&self) -> &Arc<dyn KeyValueStore> {
		&self.store
	}

	pub fn identity(&self) -> &IdentityStore {
		&self.identity
	}

	pub fn policy(&self) -> &Arc<LocalePolicy> {
		&self.policy
	}

	pub fn document(&self) -> &DocumentAttributes {
		&self.document
	}

	pub fn notifier(&self) -> &LanguageChangeNotifier {
		&self.notifier
	}

	/// The locale to render messages in, resolving it on first use.
	pub fn locale(&self) -> String {
		self.policy
			.active()
			.unwrap_or_else(|| self.policy.resolve_initial())
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Active locale resolution and persistence for Canopy clients.
//!
//! [`LocalePolicy`] picks the starting locale once per session (persisted
//! preference, then the platform language, then a default) and afterwards
//! persists every change published on a [`LanguageChangeNotifier`], updating
//! the document language attribute as it goes.
//!
//! Platform access sits behind traits so the policy runs anywhere:
//!
//! - [`KeyValueStore`](canopy_common_storage::KeyValueStore) for the stored preference
//! - [`LanguageSignal`] for the platform-reported language
//! - [`DocumentLanguage`] for the document-level `lang` attribute
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use canopy_client_locale::{
//!     DocumentAttributes, FixedLanguageSignal, LanguageChangeNotifier, LocalePolicy,
//!     SupportedLocales,
//! };
//! use canopy_common_storage::MemoryKeyValueStore;
//!
//! let supported = SupportedLocales::new(["en", "hi", "mr"], "en").unwrap();
//! let document = Arc::new(DocumentAttributes::new());
//! let policy = Arc::new(
//!     LocalePolicy::new(Arc::new(MemoryKeyValueStore::new()), supported)
//!         .with_signal(Arc::new(FixedLanguageSignal::new("mr-IN")))
//!         .with_document(document.clone()),
//! );
//!
//! assert_eq!(policy.resolve_initial(), "mr");
//!
//! let notifier = LanguageChangeNotifier::new();
//! let _subscription = policy.on_change(&notifier);
//! notifier.publish("hi").unwrap();
//! assert_eq!(document.lang().as_deref(), Some("hi"));
//! ```

mod document;
mod error;
mod notifier;
mod policy;
mod signal;
mod supported;

pub use document::{DocumentAttributes, DocumentLanguage};
pub use error::LocaleError;
pub use notifier::{LanguageChangeNotifier, Subscription};
pub use policy::{LocalePolicy, LocaleState, DEFAULT_PREFERENCE_KEY};
pub use signal::{FixedLanguageSignal, LanguageSignal, SystemLanguageSignal};
pub use supported::SupportedLocales;

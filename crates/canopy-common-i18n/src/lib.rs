// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internationalization (i18n) support for Canopy.
//!
//! This crate is the static locale registry: which locale codes exist, their
//! metadata (names, text direction), and the translation bundle for each one.
//! Choosing and persisting the *active* locale lives in `canopy-client-locale`.
//!
//! # String Naming Convention
//!
//! All translatable strings use a hierarchical dot-notation key format, for
//! example `client.locale.changed`.
//!
//! # Example
//!
//! ```
//! use canopy_common_i18n::{t, t_fmt, primary_subtag, resolve_locale};
//!
//! let label = t("hi", "client.visitor.label");
//!
//! let changed = t_fmt("mr", "client.locale.changed", &[("locale", "मराठी")]);
//!
//! assert_eq!(primary_subtag("mr-IN").as_deref(), Some("mr"));
//! assert_eq!(resolve_locale([None, Some("hi")], &["en", "hi"], "en"), "hi");
//! ```

mod catalog;
mod locale;
mod resolve;

pub use catalog::{bundle, t, t_fmt, I18nError, LocaleBundle};
pub use locale::{available_locales, is_rtl, is_supported, locale_info, Direction, LocaleInfo};
pub use resolve::{primary_subtag, resolve_locale};

pub use locale::{DEFAULT_LOCALE, LOCALES};

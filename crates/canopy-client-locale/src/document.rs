// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document-level language attribute.

use std::sync::RwLock;

use canopy_common_i18n::{locale_info, Direction};

/// The single global write target for the active language, e.g. the `lang`
/// attribute of the root document element.
pub trait DocumentLanguage: Send + Sync + std::fmt::Debug {
	fn set(&self, code: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attributes {
	lang: String,
	dir: Direction,
}

/// In-memory document attributes: `lang` plus the matching `dir`.
///
/// Codes missing from the i18n registry are written with left-to-right
/// direction.
#[derive(Debug, Default)]
pub struct DocumentAttributes {
	current: RwLock<Option<Attributes>>,
}

impl DocumentAttributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// The current `lang` attribute, if one has been set.
	pub fn lang(&self) -> Option<String> {
		self.read().map(|a| a.lang)
	}

	/// The current `dir` attribute, if one has been set.
	pub fn dir(&self) -> Option<Direction> {
		self.read().map(|a| a.dir)
	}

	fn read(&self) -> Option<Attributes> {
		self.current
			.read()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}
}

impl DocumentLanguage for DocumentAttributes {
	fn set(&self, code: &str) {
		let dir = locale_info(code).map_or(Direction::Ltr, |info| info.direction);
		let mut current = self
			.current
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		*current = Some(Attributes {
			lang: code.to_string(),
			dir,
		});
		tracing::debug!(lang = %code, dir = %dir, "document language updated");
	}
}

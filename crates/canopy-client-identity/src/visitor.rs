// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous per-client visitor identifier.
///
/// Freshly generated IDs are UUID v4 strings. IDs read back from storage are
/// kept verbatim, whatever their format, so an ID never changes once issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(String);

impl VisitorId {
	/// Generate a new random (v4) visitor ID.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	/// Wrap a stored value. Returns `None` for empty or whitespace-only values.
	pub fn from_stored(value: impl Into<String>) -> Option<Self> {
		let value = value.into();
		if value.trim().is_empty() {
			None
		} else {
			Some(Self(value))
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Parse the ID as a UUID, if it is one.
	pub fn as_uuid(&self) -> Option<Uuid> {
		Uuid::parse_str(&self.0).ok()
	}
}

impl AsRef<str> for VisitorId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for VisitorId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<VisitorId> for String {
	fn from(id: VisitorId) -> Self {
		id.0
	}
}

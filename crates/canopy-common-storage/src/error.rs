// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage error types.

/// Errors that can occur while reading or writing a storage scope.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	/// The backing store could not be read or written (disabled, full,
	/// unreadable or corrupt).
	#[error("storage unavailable for key '{key}': {reason}")]
	Unavailable { key: String, reason: String },
}

impl StorageError {
	/// Create an unavailable error for `key`.
	pub fn unavailable(key: impl Into<String>, reason: impl ToString) -> Self {
		Self::Unavailable {
			key: key.into(),
			reason: reason.to_string(),
		}
	}

	/// The key whose access failed.
	pub fn key(&self) -> &str {
		match self {
			Self::Unavailable { key, .. } => key,
		}
	}
}

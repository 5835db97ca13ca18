// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity error types.

use canopy_common_storage::StorageError;

/// Errors that can occur while reading or creating the visitor identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
	/// The storage scope could not be read or written.
	#[error("visitor identity storage unavailable: {0}")]
	StorageUnavailable(#[from] StorageError),
}

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

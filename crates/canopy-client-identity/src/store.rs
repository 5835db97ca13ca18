// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visitor identity service.

use std::sync::{Arc, Mutex, MutexGuard};

use canopy_common_storage::KeyValueStore;
use tracing::{debug, warn};

use crate::error::Result;
use crate::visitor::VisitorId;

/// Storage key holding the visitor ID.
pub const VISITOR_ID_KEY: &str = "visitor_id";

/// Whether an issued visitor ID survives the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
	/// Stored in the client's storage scope.
	Durable,
	/// Held in memory only; lost when the process exits.
	Ephemeral,
}

#[derive(Debug, Default)]
struct Memo {
	durable: Option<VisitorId>,
	transient: Option<VisitorId>,
}

/// Produces and persists the per-client visitor ID.
///
/// Constructed once by the application root and shared by reference. The ID
/// is memoized after the first successful read or write, so every caller in
/// the session observes the same value and storage is written at most once.
#[derive(Debug)]
pub struct IdentityStore {
	store: Arc<dyn KeyValueStore>,
	memo: Mutex<Memo>,
}

impl IdentityStore {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self {
			store,
			memo: Mutex::new(Memo::default()),
		}
	}

	fn memo(&self) -> MutexGuard<'_, Memo> {
		self.memo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Return the visitor ID, creating and persisting one on first use.
	///
	/// A stored non-empty value is returned unchanged. Otherwise a new UUID v4
	/// is written under [`VISITOR_ID_KEY`]; if this session already handed out
	/// a transient ID, that ID is the one persisted. The read and the write are
	/// a single atomic step on the storage scope, so services sharing a scope
	/// agree on one ID and the scope is written at most once.
	///
	/// # Errors
	///
	/// Returns [`IdentityError::StorageUnavailable`](crate::IdentityError) when
	/// the storage scope cannot be read or written. Nothing is memoized in
	/// that case.
	pub fn get_or_create(&self) -> Result<VisitorId> {
		let mut memo = self.memo();
		if let Some(id) = &memo.durable {
			return Ok(id.clone());
		}

		let candidate = memo.transient.clone().unwrap_or_else(VisitorId::generate);
		let stored = self
			.store
			.get_or_insert_with(VISITOR_ID_KEY, &|| candidate.to_string())?;
		let id = VisitorId::from_stored(stored).unwrap_or_else(|| candidate.clone());

		if id == candidate {
			debug!(visitor_id = %id, "created visitor id");
		} else {
			debug!(visitor_id = %id, "loaded existing visitor id");
		}

		memo.durable = Some(id.clone());
		memo.transient = None;
		Ok(id)
	}

	/// Read the stored visitor ID without creating one.
	///
	/// Always consults storage and never writes. Empty stored values read as
	/// absent.
	pub fn get_existing(&self) -> Result<Option<VisitorId>> {
		Ok(self
			.store
			.get(VISITOR_ID_KEY)?
			.and_then(VisitorId::from_stored))
	}

	/// Return the visitor ID, degrading to a session-only ID when storage is
	/// unavailable.
	///
	/// The transient ID is memoized, so repeated calls during an outage agree,
	/// and it is promoted to storage by the next successful
	/// [`get_or_create`](Self::get_or_create).
	pub fn get_or_transient(&self) -> (VisitorId, Persistence) {
		match self.get_or_create() {
			Ok(id) => (id, Persistence::Durable),
			Err(e) => {
				let mut memo = self.memo();
				let id = memo.transient.get_or_insert_with(VisitorId::generate).clone();
				warn!(
					error = %e,
					visitor_id = %id,
					"visitor id storage unavailable, using transient id"
				);
				(id, Persistence::Ephemeral)
			}
		}
	}
}

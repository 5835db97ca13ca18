// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-local key-value persistence for Canopy.
//!
//! A storage scope is the client-side equivalent of a browser's
//! `localStorage`: a flat map of string keys to string values that survives
//! restarts until something outside the application clears it.
//!
//! # Features
//!
//! - **KeyValueStore trait**: synchronous interface consumed by the identity
//!   and locale services
//! - **FileKeyValueStore**: JSON file-backed scope with atomic writes
//! - **MemoryKeyValueStore**: in-process scope for tests and ephemeral sessions
//!
//! # Example
//!
//! ```rust
//! use canopy_common_storage::{KeyValueStore, MemoryKeyValueStore};
//!
//! let store = MemoryKeyValueStore::new();
//! store.set("canopy-language", "hi").unwrap();
//! assert_eq!(store.get("canopy-language").unwrap().as_deref(), Some("hi"));
//! ```

mod error;
mod store;

pub use error::StorageError;
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistedScope};

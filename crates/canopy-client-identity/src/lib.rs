// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Anonymous visitor identity for Canopy clients.
//!
//! Every client storage scope gets one randomly generated visitor ID (a UUID
//! v4 string) the first time something asks for it. The ID is used to
//! correlate analytics events from the same client and never changes until
//! the storage scope is cleared from outside the application.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use canopy_client_identity::IdentityStore;
//! use canopy_common_storage::MemoryKeyValueStore;
//!
//! let identity = IdentityStore::new(Arc::new(MemoryKeyValueStore::new()));
//!
//! let first = identity.get_or_create().unwrap();
//! let second = identity.get_or_create().unwrap();
//! assert_eq!(first, second);
//! ```

mod error;
mod store;
mod visitor;

pub use error::IdentityError;
pub use store::{IdentityStore, Persistence, VISITOR_ID_KEY};
pub use visitor::VisitorId;

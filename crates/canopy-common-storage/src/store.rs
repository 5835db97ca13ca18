// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key-value storage backends.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StorageError;

/// On-disk storage scope format.
pub type PersistedScope = BTreeMap<String, String>;

/// Trait for client-local key-value storage.
///
/// One instance corresponds to one storage scope. All operations are
/// synchronous and either complete or fail immediately; there is no retry.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
	/// Read the value stored under `key`.
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// Store `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

	/// Remove `key` from the scope. Removing a missing key is not an error.
	fn remove(&self, key: &str) -> Result<(), StorageError>;

	/// Return the value under `key`, storing `init()` first if there is none.
	///
	/// Empty and whitespace-only values count as absent. The check and the
	/// write are atomic with respect to every other handle on the same scope,
	/// so concurrent callers all observe the value written by the first one.
	fn get_or_insert_with(
		&self,
		key: &str,
		init: &dyn Fn() -> String,
	) -> Result<String, StorageError>;

	/// Check whether a value exists for `key`.
	fn contains(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.get(key)?.is_some())
	}
}

fn present(scope: &PersistedScope, key: &str) -> Option<String> {
	scope.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

/// File-based storage scope with JSON format.
///
/// The whole scope lives in one JSON object. Writes go through a uniquely
/// named temp file in the same directory and replace the store atomically
/// with restricted permissions (0600 on Unix). Every read-modify-write holds
/// an exclusive advisory lock on `<path>.lock`, so handles in other threads
/// or processes never lose each other's updates.
#[derive(Debug)]
pub struct FileKeyValueStore {
	path: PathBuf,
	write_lock: Mutex<()>,
}

impl FileKeyValueStore {
	/// Create a new file store at the given path. The file is created lazily
	/// on first write.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}

	/// Get the path to the store file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Path of the sidecar lock file.
	pub fn lock_path(&self) -> PathBuf {
		let mut name = self.path.as_os_str().to_owned();
		name.push(".lock");
		PathBuf::from(name)
	}

	fn dir(&self) -> &Path {
		match self.path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		}
	}

	/// Read the entire scope from disk.
	pub fn read_scope(&self, key: &str) -> Result<PersistedScope, StorageError> {
		if !self.path.exists() {
			return Ok(PersistedScope::new());
		}

		let contents =
			fs::read_to_string(&self.path).map_err(|e| StorageError::unavailable(key, e))?;
		if contents.trim().is_empty() {
			return Ok(PersistedScope::new());
		}

		serde_json::from_str(&contents).map_err(|e| {
			warn!(path = ?self.path, error = %e, "store file is not a valid JSON object");
			StorageError::unavailable(key, e)
		})
	}

	fn write_scope(&self, key: &str, scope: &PersistedScope) -> Result<(), StorageError> {
		let contents =
			serde_json::to_string_pretty(scope).map_err(|e| StorageError::unavailable(key, e))?;

		let mut temp =
			NamedTempFile::new_in(self.dir()).map_err(|e| StorageError::unavailable(key, e))?;
		temp
			.write_all(contents.as_bytes())
			.and_then(|()| temp.as_file().sync_all())
			.map_err(|e| StorageError::unavailable(key, e))?;

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let perms = fs::Permissions::from_mode(0o600);
			if let Err(e) = temp.as_file().set_permissions(perms) {
				warn!(path = ?temp.path(), error = %e, "Failed to set file permissions to 0600");
			}
		}

		temp
			.persist(&self.path)
			.map_err(|e| StorageError::unavailable(key, e))?;

		debug!(path = ?self.path, key = %key, "store written");
		Ok(())
	}

	/// Run `mutate` against the current scope under the scope lock, writing
	/// the scope back only if it changed.
	fn update<T, F>(&self, key: &str, mutate: F) -> Result<T, StorageError>
	where
		F: FnOnce(&mut PersistedScope) -> T,
	{
		let _guard = self
			.write_lock
			.lock()
			.map_err(|_| StorageError::unavailable(key, "store lock poisoned"))?;

		fs::create_dir_all(self.dir()).map_err(|e| StorageError::unavailable(key, e))?;
		let lock_file = OpenOptions::new()
			.create(true)
			.truncate(false)
			.read(true)
			.write(true)
			.open(self.lock_path())
			.map_err(|e| StorageError::unavailable(key, e))?;
		let mut file_lock = fd_lock::RwLock::new(lock_file);
		let _file_guard = file_lock
			.write()
			.map_err(|e| StorageError::unavailable(key, e))?;

		let mut scope = self.read_scope(key)?;
		let before = scope.clone();
		let output = mutate(&mut scope);
		if scope != before {
			self.write_scope(key, &scope)?;
		}
		Ok(output)
	}
}

impl KeyValueStore for FileKeyValueStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let scope = self.read_scope(key)?;
		Ok(scope.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.update(key, |scope| {
			scope.insert(key.to_string(), value.to_string());
		})
	}

	fn remove(&self, key: &str) -> Result<(), StorageError> {
		self.update(key, |scope| {
			scope.remove(key);
		})
	}

	fn get_or_insert_with(
		&self,
		key: &str,
		init: &dyn Fn() -> String,
	) -> Result<String, StorageError> {
		self.update(key, |scope| match present(scope, key) {
			Some(value) => value,
			None => {
				let value = init();
				scope.insert(key.to_string(), value.clone());
				value
			}
		})
	}
}

/// In-memory storage scope.
///
/// Used by tests and as the ephemeral fallback when no durable storage is
/// available. The scope can be switched unavailable to exercise failure paths.
#[derive(Debug)]
pub struct MemoryKeyValueStore {
	entries: RwLock<PersistedScope>,
	available: AtomicBool,
	writes: AtomicUsize,
}

impl Default for MemoryKeyValueStore {
	fn default() -> Self {
		Self {
			entries: RwLock::new(PersistedScope::new()),
			available: AtomicBool::new(true),
			writes: AtomicUsize::new(0),
		}
	}
}

impl MemoryKeyValueStore {
	/// Create a new empty in-memory store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an in-memory store pre-populated with `entries`.
	pub fn with_entries<I, K, V>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let store = Self::new();
		if let Ok(mut map) = store.entries.write() {
			map.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
		}
		store
	}

	/// Make every subsequent operation fail (or succeed again) with
	/// [`StorageError::Unavailable`].
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::SeqCst);
	}

	/// Number of successful writes (`set` or an inserting
	/// `get_or_insert_with`) since creation.
	pub fn write_count(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	fn check_available(&self, key: &str) -> Result<(), StorageError> {
		if self.available.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(StorageError::unavailable(key, "storage disabled"))
		}
	}
}

impl KeyValueStore for MemoryKeyValueStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.check_available(key)?;
		let entries = self
			.entries
			.read()
			.map_err(|_| StorageError::unavailable(key, "store lock poisoned"))?;
		Ok(entries.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.check_available(key)?;
		let mut entries = self
			.entries
			.write()
			.map_err(|_| StorageError::unavailable(key, "store lock poisoned"))?;
		entries.insert(key.to_string(), value.to_string());
		self.writes.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StorageError> {
		self.check_available(key)?;
		let mut entries = self
			.entries
			.write()
			.map_err(|_| StorageError::unavailable(key, "store lock poisoned"))?;
		entries.remove(key);
		Ok(())
	}

	fn get_or_insert_with(
		&self,
		key: &str,
		init: &dyn Fn() -> String,
	) -> Result<String, StorageError> {
		self.check_available(key)?;
		let mut entries = self
			.entries
			.write()
			.map_err(|_| StorageError::unavailable(key, "store lock poisoned"))?;
		if let Some(value) = present(&entries, key) {
			return Ok(value);
		}
		let value = init();
		entries.insert(key.to_string(), value.clone());
		self.writes.fetch_add(1, Ordering::SeqCst);
		Ok(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::sync::Barrier;

	#[test]
	fn test_memory_store_roundtrip() {
		let store = MemoryKeyValueStore::new();
		store.set("visitor_id", "abc").unwrap();

		assert_eq!(store.get("visitor_id").unwrap().as_deref(), Some("abc"));
		assert!(store.contains("visitor_id").unwrap());
		assert_eq!(store.write_count(), 1);
	}

	#[test]
	fn test_memory_store_not_found() {
		let store = MemoryKeyValueStore::new();
		assert!(store.get("nonexistent").unwrap().is_none());
		assert!(!store.contains("nonexistent").unwrap());
	}

	#[test]
	fn test_memory_store_remove() {
		let store = MemoryKeyValueStore::with_entries([("canopy-language", "mr")]);
		store.remove("canopy-language").unwrap();
		assert!(store.get("canopy-language").unwrap().is_none());

		// removing again is fine
		store.remove("canopy-language").unwrap();
	}

	#[test]
	fn test_memory_store_unavailable() {
		let store = MemoryKeyValueStore::with_entries([("visitor_id", "abc")]);
		store.set_available(false);

		assert!(matches!(
			store.get("visitor_id"),
			Err(StorageError::Unavailable { .. })
		));
		assert!(store.set("visitor_id", "def").is_err());
		assert_eq!(store.write_count(), 0);

		store.set_available(true);
		assert_eq!(store.get("visitor_id").unwrap().as_deref(), Some("abc"));
	}

	#[test]
	fn test_file_store_missing_file_reads_empty() {
		let temp_dir = tempfile::tempdir().unwrap();
		let store = FileKeyValueStore::new(temp_dir.path().join("store.json"));

		assert!(store.get("visitor_id").unwrap().is_none());
		assert!(!store.path().exists());
	}

	#[test]
	fn test_file_store_roundtrip() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("state").join("store.json");
		let store = FileKeyValueStore::new(&path);

		store.set("visitor_id", "abc").unwrap();
		store.set("canopy-language", "hi").unwrap();
		assert!(path.exists());

		let reopened = FileKeyValueStore::new(&path);
		assert_eq!(reopened.get("visitor_id").unwrap().as_deref(), Some("abc"));
		assert_eq!(
			reopened.get("canopy-language").unwrap().as_deref(),
			Some("hi")
		);
	}

	#[test]
	fn test_file_store_remove_keeps_other_keys() {
		let temp_dir = tempfile::tempdir().unwrap();
		let store = FileKeyValueStore::new(temp_dir.path().join("store.json"));

		store.set("visitor_id", "abc").unwrap();
		store.set("canopy-language", "mr").unwrap();
		store.remove("visitor_id").unwrap();

		assert!(store.get("visitor_id").unwrap().is_none());
		assert_eq!(store.get("canopy-language").unwrap().as_deref(), Some("mr"));
	}

	#[test]
	fn test_file_store_corrupt_file_is_unavailable() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("store.json");
		std::fs::write(&path, "not json").unwrap();

		let store = FileKeyValueStore::new(&path);
		let err = store.get("visitor_id").unwrap_err();
		assert_eq!(err.key(), "visitor_id");
		assert!(store.set("visitor_id", "abc").is_err());
	}

	#[cfg(unix)]
	#[test]
	fn test_file_store_permissions() {
		use std::os::unix::fs::PermissionsExt;

		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("store.json");
		let store = FileKeyValueStore::new(&path);
		store.set("visitor_id", "abc").unwrap();

		let mode = std::fs::metadata(&path).unwrap().permissions().mode();
		assert_eq!(mode & 0o777, 0o600);
	}

	#[test]
	fn test_memory_get_or_insert_with_inserts_once() {
		let store = MemoryKeyValueStore::new();

		assert_eq!(store.get_or_insert_with("visitor_id", &|| "a".to_string()).unwrap(), "a");
		assert_eq!(store.get_or_insert_with("visitor_id", &|| "b".to_string()).unwrap(), "a");
		assert_eq!(store.write_count(), 1);
	}

	#[test]
	fn test_get_or_insert_with_replaces_blank_value() {
		let store = MemoryKeyValueStore::with_entries([("visitor_id", "  ")]);
		assert_eq!(store.get_or_insert_with("visitor_id", &|| "a".to_string()).unwrap(), "a");

		let temp_dir = tempfile::tempdir().unwrap();
		let file = FileKeyValueStore::new(temp_dir.path().join("store.json"));
		file.set("visitor_id", "").unwrap();
		assert_eq!(file.get_or_insert_with("visitor_id", &|| "b".to_string()).unwrap(), "b");
		assert_eq!(file.get_or_insert_with("visitor_id", &|| "c".to_string()).unwrap(), "b");
	}

	#[test]
	fn test_memory_get_or_insert_with_unavailable() {
		let store = MemoryKeyValueStore::new();
		store.set_available(false);
		assert!(store.get_or_insert_with("visitor_id", &|| "a".to_string()).is_err());
		assert_eq!(store.write_count(), 0);
	}

	#[test]
	fn test_file_store_writes_leave_no_temp_files() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("store.json");
		let store = FileKeyValueStore::new(&path);
		store.set("visitor_id", "abc").unwrap();
		store.set("canopy-language", "hi").unwrap();

		let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
			.unwrap()
			.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
			.collect();
		names.sort();
		assert_eq!(names, vec!["store.json", "store.json.lock"]);
	}

	#[test]
	fn test_file_store_handles_write_different_keys_concurrently() {
		for round in 0..50 {
			let temp_dir = tempfile::tempdir().unwrap();
			let path = temp_dir.path().join("store.json");
			let a = FileKeyValueStore::new(&path);
			let b = FileKeyValueStore::new(&path);
			let barrier = Barrier::new(2);

			let (ra, rb) = std::thread::scope(|s| {
				let ha = s.spawn(|| {
					barrier.wait();
					a.set("visitor_id", "abc")
				});
				let hb = s.spawn(|| {
					barrier.wait();
					b.set("canopy-language", "hi")
				});
				(ha.join().unwrap(), hb.join().unwrap())
			});

			assert!(ra.is_ok(), "round {round}: {ra:?}");
			assert!(rb.is_ok(), "round {round}: {rb:?}");
			let reopened = FileKeyValueStore::new(&path);
			assert_eq!(reopened.get("visitor_id").unwrap().as_deref(), Some("abc"));
			assert_eq!(
				reopened.get("canopy-language").unwrap().as_deref(),
				Some("hi")
			);
		}
	}

	#[test]
	fn test_file_store_handles_agree_on_inserted_value() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("store.json");
		let barrier = Barrier::new(4);

		let values: Vec<String> = std::thread::scope(|s| {
			let handles: Vec<_> = (0..4)
				.map(|i| {
					let store = FileKeyValueStore::new(&path);
					let barrier = &barrier;
					s.spawn(move || {
						barrier.wait();
						store
							.get_or_insert_with("visitor_id", &|| format!("id-{i}"))
							.unwrap()
					})
				})
				.collect();
			handles.into_iter().map(|h| h.join().unwrap()).collect()
		});

		assert!(values.windows(2).all(|w| w[0] == w[1]), "{values:?}");
		let stored = FileKeyValueStore::new(&path).get("visitor_id").unwrap();
		assert_eq!(stored.as_deref(), Some(values[0].as_str()));
	}

	proptest! {
		#[test]
		fn prop_last_write_wins(values in proptest::collection::vec("[a-z0-9-]{1,16}", 1..8)) {
			let store = MemoryKeyValueStore::new();
			for v in &values {
				store.set("k", v).unwrap();
			}
			prop_assert_eq!(store.get("k").unwrap(), values.last().cloned());
			prop_assert_eq!(store.write_count(), values.len());
		}
	}
}

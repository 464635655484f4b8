//! Browser-local persistence.
//!
//! Everything persisted by the page goes through [`KeyValueStore`], backed by
//! `window.localStorage` in the browser and by [`MemoryStore`] in tests or
//! when local storage is unavailable (private browsing, disabled cookies).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod ledger;
pub mod source_tracking;

pub use ledger::{LedgerEntry, SubmissionLedger};
pub use source_tracking::{SourceData, SourceStore};

/// Errors raised by the persistence layer. Callers log and degrade.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("local storage is unavailable")]
	Unavailable,
	#[error("storage access failed: {0}")]
	Access(String),
	#[error("stored value is not valid JSON: {0}")]
	Corrupt(#[from] serde_json::Error),
}

/// Minimal string key/value store.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
	fn storage(&self) -> Result<web_sys::Storage, StorageError> {
		web_sys::window()
			.ok_or(StorageError::Unavailable)?
			.local_storage()
			.map_err(|e| StorageError::Access(format!("{:?}", e)))?
			.ok_or(StorageError::Unavailable)
	}
}

impl KeyValueStore for LocalStorage {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.storage()?
			.get_item(key)
			.map_err(|e| StorageError::Access(format!("{:?}", e)))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.storage()?
			.set_item(key, value)
			.map_err(|e| StorageError::Access(format!("{:?}", e)))
	}
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	items: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.items
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Read and decode a JSON value, `Ok(None)` when the key is absent.
pub fn read_json<T: DeserializeOwned>(
	store: &impl KeyValueStore,
	key: &str,
) -> Result<Option<T>, StorageError> {
	match store.get(key)? {
		Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
		None => Ok(None),
	}
}

/// Encode and write a JSON value.
pub fn write_json<T: Serialize + ?Sized>(
	store: &impl KeyValueStore,
	key: &str,
	value: &T,
) -> Result<(), StorageError> {
	let raw = serde_json::to_string(value)?;
	store.set(key, &raw)
}

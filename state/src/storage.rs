//! Persistent string-keyed backends.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};

use crate::error::StateError;

/// A synchronous string-keyed store, shaped after the Web Storage API.
pub trait StorageBackend {
    /// Reads the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails when the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails when the backend rejects the write, e.g. when it is full.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Deletes `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Fails when the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StateError>;

    /// Deletes every key.
    ///
    /// # Errors
    ///
    /// Fails when the backend cannot be written.
    fn clear(&self) -> Result<(), StateError>;
}

/// The browser's `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Binds to `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Unsupported`] off `wasm32` and
    /// [`StateError::Unavailable`] when storage is disabled.
    pub fn new() -> Result<Self, StateError> {
        if !cfg!(target_arch = "wasm32") {
            return Err(StateError::Unsupported);
        }
        let window = web_sys::window().ok_or(StateError::Unavailable)?;
        let storage = window.local_storage()?.ok_or(StateError::Unavailable)?;
        Ok(Self { storage })
    }
}

fn storage_error(error: JsValue) -> StateError {
    match error.dyn_ref::<web_sys::DomException>() {
        Some(exception) if exception.name() == "QuotaExceededError" => StateError::QuotaExceeded,
        _ => StateError::from(error),
    }
}

impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StateError> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StateError> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StateError> {
        self.storage.remove_item(key).map_err(storage_error)
    }

    fn clear(&self) -> Result<(), StateError> {
        self.storage.clear().map_err(storage_error)
    }
}

/// An in-memory backend.
///
/// Clones share the same entries, so a test can keep a handle to inspect what
/// a [`StateManager`](crate::StateManager) wrote. An optional quota, counted
/// in bytes of keys plus values, makes writes fail the way a full
/// `localStorage` does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that holds at most `bytes` bytes.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Rc::default(),
            quota: Some(bytes),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Reads the raw stored text for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StateError> {
        if let Some(quota) = self.quota
            && self.used_without(key) + key.len() + value.len() > quota
        {
            return Err(StateError::QuotaExceeded);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StateError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStorage, StorageBackend};
    use crate::error::StateError;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set_item("k", "v").expect("write");
        assert_eq!(handle.raw("k").as_deref(), Some("v"));
        handle.clear().expect("clear");
        assert!(storage.is_empty());
    }

    #[test]
    fn quota_counts_keys_and_values() {
        let storage = MemoryStorage::with_quota(8);
        storage.set_item("ab", "cdef").expect("6 bytes fit");
        // Overwriting replaces the old value's share of the quota.
        storage.set_item("ab", "cdefgh").expect("8 bytes fit");
        assert_eq!(storage.set_item("x", "y"), Err(StateError::QuotaExceeded));
        assert_eq!(storage.raw("x"), None);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn local_storage_is_unsupported_off_wasm() {
        if !cfg!(target_arch = "wasm32") {
            assert_eq!(
                super::LocalStorage::new().unwrap_err(),
                StateError::Unsupported
            );
        }
    }
}

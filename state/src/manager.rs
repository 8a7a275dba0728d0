//! The state manager: typed reads and writes plus per-key change callbacks.

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::{decode, encode};
use crate::error::StateError;
use crate::storage::{LocalStorage, MemoryStorage, StorageBackend};

/// Callback notified with the new value of a key, `None` once it is gone.
pub type ChangeCallback = Rc<dyn Fn(Option<&Value>)>;

/// Reactive key/value store over a [`StorageBackend`].
///
/// Every operation is fail-soft: backend errors, unsupported values and
/// malformed stored data are logged through `tracing` and turned into a
/// no-op or `None`. Nothing here returns an error to the caller.
///
/// Callbacks run synchronously, in registration order, after a successful
/// write. A callback may call back into the manager, including writing the
/// key it is observing.
pub struct StateManager {
    backend: Box<dyn StorageBackend>,
    callbacks: RefCell<Vec<(String, Vec<ChangeCallback>)>>,
}

impl StateManager {
    /// Creates a manager over `backend`.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Creates a manager over `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Fails when local storage is unavailable on this target.
    pub fn local() -> Result<Self, StateError> {
        Ok(Self::new(LocalStorage::new()?))
    }

    /// Creates a manager over a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Stores `value` under `key` and notifies the key's callbacks.
    ///
    /// Strings, numbers, objects, arrays and null are supported. Anything
    /// else, such as a boolean, is logged and leaves the stored value as it
    /// was. `NaN` and the infinities have no JSON form and are stored as
    /// null, so the key then reads back as `None`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match self.try_set(key, value) {
            Ok(stored) => self.notify(key, stored.as_ref()),
            Err(error) => tracing::error!(key, %error, "failed to store state"),
        }
    }

    fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<Option<Value>, StateError> {
        let value =
            serde_json::to_value(value).map_err(|error| StateError::Serialize(error.to_string()))?;
        let raw = encode(&value)?;
        self.backend.set_item(key, &raw)?;
        tracing::debug!(key, "stored state");
        Ok(if value.is_null() { None } else { Some(value) })
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` for absent keys, stored nulls, and data that cannot be
    /// decoded.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let read = self
            .backend
            .get_item(key)
            .and_then(|raw| raw.as_deref().map_or(Ok(None), decode));
        match read {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(key, %error, "failed to read state");
                None
            }
        }
    }

    /// Reads the value under `key` and deserializes it into `T`.
    ///
    /// A value of the wrong shape is logged and reported as `None`.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(key, %error, "stored state has an unexpected shape");
                None
            }
        }
    }

    /// Applies `updater` to the current value and stores the result.
    ///
    /// `updater` receives `None` when the key is absent. The updater's result
    /// is returned even if storing it failed.
    pub fn update<T, F>(&self, key: &str, updater: F) -> T
    where
        T: Serialize,
        F: FnOnce(Option<Value>) -> T,
    {
        let next = updater(self.get(key));
        self.set(key, &next);
        next
    }

    /// Deletes `key` and notifies its callbacks with `None`.
    pub fn remove(&self, key: &str) {
        match self.backend.remove_item(key) {
            Ok(()) => {
                tracing::debug!(key, "removed state");
                self.notify(key, None);
            }
            Err(error) => tracing::error!(key, %error, "failed to remove state"),
        }
    }

    /// Empties the whole backend.
    ///
    /// Only keys that have callbacks are notified (with `None`); every other
    /// key is removed silently.
    pub fn clear(&self) {
        if let Err(error) = self.backend.clear() {
            tracing::error!(%error, "failed to clear state");
            return;
        }
        let observed: Vec<String> = self
            .callbacks
            .borrow()
            .iter()
            .filter(|(_, callbacks)| !callbacks.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        tracing::debug!(notified = observed.len(), "cleared state");
        for key in observed {
            self.notify(&key, None);
        }
    }

    /// Registers `callback` for changes to `key`.
    ///
    /// Registrations are never deduplicated and cannot be undone.
    pub fn on_change<F>(&self, key: &str, callback: F)
    where
        F: Fn(Option<&Value>) + 'static,
    {
        let callback: ChangeCallback = Rc::new(callback);
        let mut callbacks = self.callbacks.borrow_mut();
        match callbacks.iter_mut().find(|(k, _)| k == key) {
            Some((_, list)) => list.push(callback),
            None => callbacks.push((key.to_owned(), vec![callback])),
        }
    }

    fn notify(&self, key: &str, value: Option<&Value>) {
        let snapshot: Vec<ChangeCallback> = self
            .callbacks
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, list)| list.clone())
            .unwrap_or_default();
        for callback in snapshot {
            callback(value);
        }
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let callbacks = self.callbacks.borrow();
        f.debug_struct("StateManager")
            .field("observed_keys", &callbacks.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::{Deserialize, Serialize, Serializer};
    use serde_json::{Value, json};

    use super::StateManager;
    use crate::storage::{MemoryStorage, StorageBackend};

    type Log = Rc<RefCell<Vec<(String, Option<Value>)>>>;

    fn record(manager: &StateManager, key: &str, label: &str) -> Log {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let label = label.to_owned();
        manager.on_change(key, move |value| {
            sink.borrow_mut().push((label.clone(), value.cloned()));
        });
        log
    }

    #[test]
    fn round_trips_preserve_kind() {
        let manager = StateManager::in_memory();
        let cases = [
            json!("5"),
            json!(5),
            json!(2.5),
            json!(-3),
            json!({"name": "ada", "tags": ["a", "b"]}),
            json!([1, "two"]),
        ];
        for value in cases {
            manager.set("k", &value);
            assert_eq!(manager.get("k"), Some(value));
        }
        manager.set("k", &Value::Null);
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn numeric_string_and_number_stay_distinct() {
        let manager = StateManager::in_memory();
        manager.set("text", "5");
        manager.set("number", &5);
        assert_eq!(manager.get("text"), Some(json!("5")));
        assert_eq!(manager.get("number"), Some(json!(5)));
        assert_ne!(manager.get("text"), manager.get("number"));
    }

    #[test]
    fn null_is_stored_as_sentinel_not_absent() {
        let storage = MemoryStorage::new();
        let manager = StateManager::new(storage.clone());
        manager.set("k", &Option::<u8>::None);
        assert_eq!(storage.raw("k").as_deref(), Some("null"));
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn non_finite_numbers_are_stored_as_null() {
        let storage = MemoryStorage::new();
        let manager = StateManager::new(storage.clone());
        let log = record(&manager, "k", "cb");
        manager.set("k", &1.5);
        manager.set("k", &f64::NAN);
        assert_eq!(storage.raw("k").as_deref(), Some("null"));
        assert_eq!(manager.get("k"), None);
        manager.set("k", &f64::INFINITY);
        assert_eq!(manager.get("k"), None);
        assert_eq!(
            *log.borrow(),
            [
                ("cb".to_owned(), Some(json!(1.5))),
                ("cb".to_owned(), None),
                ("cb".to_owned(), None),
            ]
        );
    }

    #[test]
    fn remove_then_get_is_none() {
        let manager = StateManager::in_memory();
        manager.set("k", "v");
        manager.remove("k");
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn update_on_absent_key_sees_none() {
        let manager = StateManager::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let result = manager.update("count", {
            let seen = Rc::clone(&seen);
            move |current| {
                seen.borrow_mut().push(current.clone());
                current.and_then(|v| v.as_i64()).unwrap_or(0) + 1
            }
        });
        assert_eq!(result, 1);
        assert_eq!(*seen.borrow(), [None]);
        assert_eq!(manager.get("count"), Some(json!(1)));

        let result = manager.update("count", |current| {
            current.and_then(|v| v.as_i64()).unwrap_or(0) + 1
        });
        assert_eq!(result, 2);
        assert_eq!(manager.get_as::<i64>("count"), Some(2));
    }

    #[test]
    fn callbacks_fire_once_per_change_in_order() {
        let manager = StateManager::in_memory();
        let log: Log = Rc::default();
        for label in ["first", "second"] {
            let sink = Rc::clone(&log);
            manager.on_change("k", move |value| {
                sink.borrow_mut().push((label.to_owned(), value.cloned()));
            });
        }

        manager.set("k", "a");
        manager.remove("k");
        manager.clear();

        let expected = vec![
            ("first".to_owned(), Some(json!("a"))),
            ("second".to_owned(), Some(json!("a"))),
            ("first".to_owned(), None),
            ("second".to_owned(), None),
            ("first".to_owned(), None),
            ("second".to_owned(), None),
        ];
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn clear_notifies_only_observed_keys_but_wipes_everything() {
        let storage = MemoryStorage::new();
        let manager = StateManager::new(storage.clone());
        manager.set("watched", "x");
        manager.set("ignored", "y");
        let log = record(&manager, "watched", "w");

        manager.clear();

        assert!(storage.is_empty());
        assert_eq!(*log.borrow(), [("w".to_owned(), None)]);
        assert_eq!(manager.get("ignored"), None);
    }

    #[test]
    fn unsupported_values_leave_previous_value() {
        let manager = StateManager::in_memory();
        let log = record(&manager, "k", "cb");
        manager.set("k", "kept");
        manager.set("k", &true);
        assert_eq!(manager.get("k"), Some(json!("kept")));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn serialization_failures_are_swallowed() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("functions cannot be stored"))
            }
        }

        let manager = StateManager::in_memory();
        manager.set("k", &1);
        manager.set("k", &Unserializable);
        assert_eq!(manager.get("k"), Some(json!(1)));
    }

    #[test]
    fn malformed_data_reads_as_none() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "{not json").expect("write");
        let manager = StateManager::new(storage);
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn quota_failures_degrade_to_no_op() {
        let storage = MemoryStorage::with_quota(40);
        let manager = StateManager::new(storage.clone());
        let log = record(&manager, "k", "cb");
        manager.set("k", "small");
        manager.set("k", &"x".repeat(100));
        assert_eq!(manager.get("k"), Some(json!("small")));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn typed_reads() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Todo {
            title: String,
            done: bool,
        }

        let manager = StateManager::in_memory();
        let todo = Todo {
            title: "write tests".into(),
            done: true,
        };
        manager.set("todo", &todo);
        assert_eq!(manager.get_as::<Todo>("todo"), Some(todo));
        assert_eq!(manager.get_as::<u32>("todo"), None);
    }

    #[test]
    fn callbacks_may_write_back_into_the_manager() {
        let manager = Rc::new(StateManager::in_memory());
        let weak = Rc::downgrade(&manager);
        manager.on_change("celsius", move |value| {
            let Some(manager) = weak.upgrade() else { return };
            let celsius = value.and_then(Value::as_f64).unwrap_or(0.0);
            manager.set("fahrenheit", &(celsius * 9.0 / 5.0 + 32.0));
        });
        manager.set("celsius", &100.0);
        assert_eq!(manager.get("fahrenheit"), Some(json!(212.0)));
    }

    #[test]
    fn registration_during_notification_waits_for_next_change() {
        let manager = Rc::new(StateManager::in_memory());
        let late = Rc::new(RefCell::new(0));
        let weak = Rc::downgrade(&manager);
        let counter = Rc::clone(&late);
        manager.on_change("k", move |_| {
            if let Some(manager) = weak.upgrade() {
                let counter = Rc::clone(&counter);
                manager.on_change("k", move |_| *counter.borrow_mut() += 1);
            }
        });
        manager.set("k", "a");
        assert_eq!(*late.borrow(), 0);
        manager.set("k", "b");
        assert_eq!(*late.borrow(), 1);
    }
}

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

//! Persistent key/value state for `hashkit` applications.
//!
//! [`StateManager`] stores JSON-compatible values in a [`StorageBackend`]
//! (normally `window.localStorage`) and notifies per-key callbacks whenever a
//! value changes. Storage failures never reach application code: they are
//! logged and the operation quietly does nothing.
//!
//! ```
//! use hashkit_state::StateManager;
//! use serde_json::json;
//!
//! let state = StateManager::in_memory();
//! state.on_change("theme", |value| println!("theme is now {value:?}"));
//! state.set("theme", "dark");
//! assert_eq!(state.get("theme"), Some(json!("dark")));
//! ```

pub mod envelope;
mod error;
mod manager;
mod storage;

pub use error::StateError;
pub use manager::{ChangeCallback, StateManager};
pub use storage::{LocalStorage, MemoryStorage, StorageBackend};

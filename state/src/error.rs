use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures raised inside the state manager.
///
/// [`StateManager`](crate::StateManager) never hands these to callers; they
/// are logged and the operation degrades to a no-op or an absent value.
/// Storage backends return them so the manager can do that uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The value serialized to a kind the envelope cannot carry.
    #[error("unsupported value type `{0}`")]
    UnsupportedType(&'static str),
    /// The value could not be turned into JSON.
    #[error("failed to serialize value: {0}")]
    Serialize(String),
    /// Stored data is not a valid envelope.
    #[error("malformed stored data: {0}")]
    Malformed(String),
    /// The storage backend is disabled or missing.
    #[error("storage is unavailable")]
    Unavailable,
    /// `localStorage` was requested on a target without a JavaScript host.
    #[error("localStorage requires the wasm32 target")]
    Unsupported,
    /// The backend refused the write because it is full.
    #[error("storage quota exceeded")]
    QuotaExceeded,
    /// Wrapper around JavaScript exceptions.
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for StateError {
    fn from(value: JsValue) -> Self {
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

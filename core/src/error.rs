use thiserror::Error;
use wasm_bindgen::JsValue;

/// Error type produced by document operations and the element builder.
///
/// Every variant represents a wiring mistake in the calling application, so
/// these errors are returned to the caller instead of being logged away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The DOM APIs are not accessible (e.g., no `window` or `document`).
    #[error("DOM is not available")]
    DomUnavailable,
    /// The browser backend was requested on a target without a JavaScript host.
    #[error("the browser document backend requires the wasm32 target")]
    Unsupported,
    /// A caller supplied a value the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No element with the requested id is attached to the document.
    #[error("failed to find DOM element with id `{0}`")]
    NotFound(String),
    /// Wrapper around JavaScript exceptions.
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl DomError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

impl From<DomError> for JsValue {
    fn from(value: DomError) -> Self {
        match value {
            DomError::Js(msg) => Self::from(msg),
            other => Self::from(other.to_string()),
        }
    }
}

//! Events delivered to listeners registered through the element builder.

use std::rc::Rc;
use std::cell::Cell;

/// Listener callback registered on a node.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Wraps a closure into an [`EventHandler`].
pub fn handler(f: impl Fn(&Event) + 'static) -> EventHandler {
    Rc::new(f)
}

/// An event dispatched to a node.
///
/// Browser events carry the underlying [`web_sys::Event`]; events dispatched
/// on the virtual document are synthetic and only record their own state.
#[derive(Debug)]
pub struct Event {
    name: String,
    default_prevented: Cell<bool>,
    raw: Option<web_sys::Event>,
}

impl Event {
    /// Creates a synthetic event with the given type name.
    #[must_use]
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_prevented: Cell::new(false),
            raw: None,
        }
    }

    pub(crate) fn from_raw(raw: web_sys::Event) -> Self {
        Self {
            name: raw.type_(),
            default_prevented: Cell::new(false),
            raw: Some(raw),
        }
    }

    /// Returns the event type, e.g. `click`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cancels the host's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
        if let Some(raw) = &self.raw {
            raw.prevent_default();
        }
    }

    /// Returns whether [`Self::prevent_default`] was called.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Returns the browser event, if this event came from the browser.
    #[must_use]
    pub const fn raw(&self) -> Option<&web_sys::Event> {
        self.raw.as_ref()
    }
}

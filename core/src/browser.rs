//! The live browser host, bound through `web-sys`.

use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Element, Window};

use crate::error::DomError;
use crate::event::{Event, EventHandler};
use crate::props::{PropValue, Property};

/// Handles to the live `window` and `document`.
#[derive(Debug, Clone)]
pub(crate) struct BrowserDocument {
    window: Window,
    document: web_sys::Document,
}

impl BrowserDocument {
    pub(crate) fn new() -> Result<Self, DomError> {
        if !cfg!(target_arch = "wasm32") {
            return Err(DomError::Unsupported);
        }
        let window: Window = web_sys::window().ok_or(DomError::DomUnavailable)?;
        let document = window.document().ok_or(DomError::DomUnavailable)?;
        Ok(Self { window, document })
    }

    pub(crate) const fn raw(&self) -> &web_sys::Document {
        &self.document
    }

    pub(crate) fn create_element(&self, tag: &str) -> Result<web_sys::Node, DomError> {
        let element = self.document.create_element(tag)?;
        Ok(element.into())
    }

    pub(crate) fn create_text_node(&self, text: &str) -> web_sys::Node {
        self.document.create_text_node(text).into()
    }

    pub(crate) fn get_element_by_id(&self, id: &str) -> Option<web_sys::Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }

    pub(crate) fn hash(&self) -> Result<String, DomError> {
        Ok(self.window.location().hash()?)
    }

    pub(crate) fn set_hash(&self, hash: &str) -> Result<(), DomError> {
        self.window.location().set_hash(hash)?;
        Ok(())
    }

    /// Installs a `hashchange` listener for the rest of the page lifetime.
    pub(crate) fn on_hash_change(&self, listener: Rc<dyn Fn()>) -> Result<(), DomError> {
        let closure = Closure::<dyn FnMut()>::new(move || listener());
        self.window
            .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

pub(crate) fn append_child(parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), DomError> {
    parent.append_child(child)?;
    Ok(())
}

pub(crate) fn clear_children(node: &web_sys::Node) -> Result<(), DomError> {
    while let Some(child) = node.first_child() {
        node.remove_child(&child)?;
    }
    Ok(())
}

fn as_element(node: &web_sys::Node) -> Result<&Element, DomError> {
    node.dyn_ref::<Element>()
        .ok_or_else(|| DomError::invalid("operation requires an element node"))
}

pub(crate) fn set_attribute(node: &web_sys::Node, name: &str, value: &str) -> Result<(), DomError> {
    as_element(node)?.set_attribute(name, value)?;
    Ok(())
}

/// Assigns `element[property] = value` without string coercion.
pub(crate) fn set_property(
    node: &web_sys::Node,
    property: Property,
    value: &PropValue,
) -> Result<(), DomError> {
    let element = as_element(node)?;
    let value = match value {
        PropValue::Text(text) => JsValue::from_str(text),
        PropValue::Number(number) => JsValue::from_f64(*number),
        PropValue::Bool(flag) => JsValue::from_bool(*flag),
        PropValue::Handler(_) => {
            return Err(DomError::invalid(format!(
                "`{}` cannot be assigned an event handler",
                property.key()
            )));
        }
    };
    js_sys::Reflect::set(element, &JsValue::from_str(property.key()), &value)?;
    Ok(())
}

/// Registers `handler` for `event`; the listener stays installed for the
/// lifetime of the node.
pub(crate) fn add_event_listener(
    node: &web_sys::Node,
    event: &str,
    handler: EventHandler,
) -> Result<(), DomError> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
        handler(&Event::from_raw(raw));
    });
    node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

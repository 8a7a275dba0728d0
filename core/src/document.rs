//! Host document abstraction.
//!
//! [`Document`] hides whether nodes live in the browser DOM or in the
//! in-memory [`VirtualDocument`]. Every operation the builder and router need
//! goes through it, so the same application code runs in both.

use std::rc::Rc;

use crate::browser::{self, BrowserDocument};
use crate::error::DomError;
use crate::event::EventHandler;
use crate::props::{PropValue, Property};
use crate::virtual_dom::{VirtualDocument, VirtualNode};

/// The concrete host a [`Document`] talks to.
#[derive(Debug, Clone)]
enum Host {
    Browser(BrowserDocument),
    Virtual(VirtualDocument),
}

/// A node created by a [`Document`].
#[derive(Debug, Clone)]
pub struct Node {
    inner: NodeInner,
}

#[derive(Debug, Clone)]
enum NodeInner {
    Browser(web_sys::Node),
    Virtual(VirtualNode),
}

impl Node {
    /// Returns the browser node, if this node lives in the browser DOM.
    #[must_use]
    pub const fn as_web(&self) -> Option<&web_sys::Node> {
        match &self.inner {
            NodeInner::Browser(node) => Some(node),
            NodeInner::Virtual(_) => None,
        }
    }

    /// Returns the in-memory node, if this node lives in a virtual document.
    #[must_use]
    pub const fn as_virtual(&self) -> Option<&VirtualNode> {
        match &self.inner {
            NodeInner::Virtual(node) => Some(node),
            NodeInner::Browser(_) => None,
        }
    }
}

impl From<web_sys::Node> for Node {
    fn from(value: web_sys::Node) -> Self {
        Self {
            inner: NodeInner::Browser(value),
        }
    }
}

impl From<VirtualNode> for Node {
    fn from(value: VirtualNode) -> Self {
        Self {
            inner: NodeInner::Virtual(value),
        }
    }
}

/// Handle to the document nodes are created in.
///
/// Cloning is cheap and yields a handle to the same document.
#[derive(Debug, Clone)]
pub struct Document {
    host: Host,
}

impl Document {
    /// Binds to the live browser `document`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Unsupported`] off `wasm32`, and
    /// [`DomError::DomUnavailable`] when there is no `window`/`document`.
    pub fn browser() -> Result<Self, DomError> {
        Ok(Self {
            host: Host::Browser(BrowserDocument::new()?),
        })
    }

    /// Creates a fresh in-memory document.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from(VirtualDocument::new())
    }

    /// Returns the in-memory document, if this handle wraps one.
    #[must_use]
    pub const fn as_virtual(&self) -> Option<&VirtualDocument> {
        match &self.host {
            Host::Virtual(document) => Some(document),
            Host::Browser(_) => None,
        }
    }

    /// Returns the browser document, if this handle wraps one.
    #[must_use]
    pub const fn as_web(&self) -> Option<&web_sys::Document> {
        match &self.host {
            Host::Browser(document) => Some(document.raw()),
            Host::Virtual(_) => None,
        }
    }

    /// Creates an element named `tag`.
    ///
    /// # Errors
    ///
    /// Fails when the host rejects the tag name.
    pub fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        match &self.host {
            Host::Browser(document) => document.create_element(tag).map(Node::from),
            Host::Virtual(document) => document.create_element(tag).map(Node::from),
        }
    }

    /// Creates a text node.
    #[must_use]
    pub fn create_text_node(&self, text: &str) -> Node {
        match &self.host {
            Host::Browser(document) => document.create_text_node(text).into(),
            Host::Virtual(document) => document.create_text_node(text).into(),
        }
    }

    /// Finds an attached element by id.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        match &self.host {
            Host::Browser(document) => document.get_element_by_id(id).map(Node::from),
            Host::Virtual(document) => document.get_element_by_id(id).map(Node::from),
        }
    }

    /// Appends `child` to `parent`, moving it if it is already attached.
    ///
    /// # Errors
    ///
    /// Fails when either node belongs to another host or the host rejects the
    /// insertion (text parents, cycles).
    pub fn append_child(&self, parent: &Node, child: &Node) -> Result<(), DomError> {
        match (&self.host, &parent.inner, &child.inner) {
            (Host::Browser(_), NodeInner::Browser(parent), NodeInner::Browser(child)) => {
                browser::append_child(parent, child)
            }
            (Host::Virtual(_), NodeInner::Virtual(parent), NodeInner::Virtual(child)) => {
                parent.append_child(child)
            }
            _ => Err(foreign_node()),
        }
    }

    /// Removes every child of `node`.
    ///
    /// # Errors
    ///
    /// Fails when `node` belongs to another host or the host refuses.
    pub fn clear_children(&self, node: &Node) -> Result<(), DomError> {
        match (&self.host, &node.inner) {
            (Host::Browser(_), NodeInner::Browser(node)) => browser::clear_children(node),
            (Host::Virtual(_), NodeInner::Virtual(node)) => {
                node.clear_children();
                Ok(())
            }
            _ => Err(foreign_node()),
        }
    }

    /// Sets a content attribute on an element.
    ///
    /// # Errors
    ///
    /// Fails for text nodes and nodes of another host.
    pub fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        match (&self.host, &node.inner) {
            (Host::Browser(_), NodeInner::Browser(node)) => {
                browser::set_attribute(node, name, value)
            }
            (Host::Virtual(_), NodeInner::Virtual(node)) => node.set_attribute(name, value),
            _ => Err(foreign_node()),
        }
    }

    /// Assigns an allow-listed property on an element.
    ///
    /// # Errors
    ///
    /// Fails for handler values, text nodes and nodes of another host.
    pub fn set_property(
        &self,
        node: &Node,
        property: Property,
        value: &PropValue,
    ) -> Result<(), DomError> {
        match (&self.host, &node.inner) {
            (Host::Browser(_), NodeInner::Browser(node)) => {
                browser::set_property(node, property, value)
            }
            (Host::Virtual(_), NodeInner::Virtual(node)) => {
                let text = value.coerce().ok_or_else(|| {
                    DomError::invalid(format!(
                        "`{}` cannot be assigned an event handler",
                        property.key()
                    ))
                })?;
                node.set_property(property, &text)
            }
            _ => Err(foreign_node()),
        }
    }

    /// Registers an event listener on `node`.
    ///
    /// # Errors
    ///
    /// Fails for nodes of another host or when the browser refuses the
    /// listener.
    pub fn add_event_listener(
        &self,
        node: &Node,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DomError> {
        match (&self.host, &node.inner) {
            (Host::Browser(_), NodeInner::Browser(node)) => {
                browser::add_event_listener(node, event, handler)
            }
            (Host::Virtual(_), NodeInner::Virtual(node)) => {
                node.add_listener(event, handler);
                Ok(())
            }
            _ => Err(foreign_node()),
        }
    }

    /// Reads `location.hash`, including the leading `#` when present.
    ///
    /// # Errors
    ///
    /// Fails when the browser location cannot be read.
    pub fn hash(&self) -> Result<String, DomError> {
        match &self.host {
            Host::Browser(document) => document.hash(),
            Host::Virtual(document) => Ok(document.hash()),
        }
    }

    /// Reads `location.hash` without its leading `#`.
    ///
    /// # Errors
    ///
    /// Fails when the browser location cannot be read.
    pub fn hash_fragment(&self) -> Result<String, DomError> {
        let hash = self.hash()?;
        Ok(hash.strip_prefix('#').unwrap_or(&hash).to_owned())
    }

    /// Assigns `location.hash`, which fires `hashchange` when it changes.
    ///
    /// # Errors
    ///
    /// Fails when the browser location cannot be written.
    pub fn set_hash(&self, hash: &str) -> Result<(), DomError> {
        match &self.host {
            Host::Browser(document) => document.set_hash(hash),
            Host::Virtual(document) => {
                document.set_hash(hash);
                Ok(())
            }
        }
    }

    /// Subscribes `listener` to `hashchange` for the rest of the page
    /// lifetime. There is no way to unsubscribe.
    ///
    /// # Errors
    ///
    /// Fails when the browser refuses the listener.
    pub fn on_hash_change(&self, listener: Rc<dyn Fn()>) -> Result<(), DomError> {
        match &self.host {
            Host::Browser(document) => document.on_hash_change(listener),
            Host::Virtual(document) => {
                document.on_hash_change(listener);
                Ok(())
            }
        }
    }
}

impl From<VirtualDocument> for Document {
    fn from(value: VirtualDocument) -> Self {
        Self {
            host: Host::Virtual(value),
        }
    }
}

fn foreign_node() -> DomError {
    DomError::invalid("node belongs to a different document host")
}

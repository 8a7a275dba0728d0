//! In-memory document used off-browser and in tests.
//!
//! The virtual document mirrors the small slice of DOM behaviour the builder
//! and router rely on: element/text nodes, attributes, reflected properties,
//! listeners, `getElementById` over the attached tree, and a `location.hash`
//! channel whose changes fire `hashchange` listeners synchronously.

use core::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::DomError;
use crate::event::{Event, EventHandler};
use crate::props::Property;

type HashListener = Rc<dyn Fn()>;

/// A node owned by a [`VirtualDocument`].
#[derive(Clone)]
pub struct VirtualNode(Rc<RefCell<NodeData>>);

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<VirtualNode>,
    listeners: Vec<(String, EventHandler)>,
}

enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        properties: Vec<(String, String)>,
    },
    Text(String),
}

impl VirtualNode {
    fn new(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    /// Returns `true` if both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Lower-cased tag name, `None` for text nodes.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns `true` for text nodes.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => data.children.iter().map(Self::text_content).collect(),
        }
    }

    /// Reads a content attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => lookup(attributes, name),
            NodeKind::Text(_) => None,
        }
    }

    /// Reads a property assigned through the element builder's property rule.
    ///
    /// Reflected properties (e.g. `id`, `href`) are read back from their
    /// content attribute.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        let data = self.0.borrow();
        let NodeKind::Element {
            tag,
            attributes,
            properties,
        } = &data.kind
        else {
            return None;
        };
        match Property::lookup(tag, key).and_then(Property::reflected_attribute) {
            Some(attribute) => lookup(attributes, attribute),
            None => lookup(properties, key),
        }
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0.borrow().children.clone()
    }

    /// The parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(Self)
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Dispatches a synthetic event to this node's listeners, in registration
    /// order, and returns it for inspection. Events do not bubble.
    pub fn dispatch(&self, event: &str) -> Event {
        let handlers: Vec<EventHandler> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        let event = Event::synthetic(event);
        for handler in handlers {
            handler(&event);
        }
        event
    }

    fn is_ancestor_of(&self, node: &Self) -> bool {
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if candidate.ptr_eq(self) {
                return true;
            }
            current = candidate.parent();
        }
        false
    }

    fn find_by_id(&self, id: &str) -> Option<Self> {
        if self.attribute("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|child| child.find_by_id(id))
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .borrow_mut()
                .children
                .retain(|child| !child.ptr_eq(self));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    pub(crate) fn append_child(&self, child: &Self) -> Result<(), DomError> {
        if self.is_text() {
            return Err(DomError::invalid("text nodes cannot have children"));
        }
        if child.is_ancestor_of(self) {
            return Err(DomError::invalid(
                "a node cannot be appended to itself or one of its descendants",
            ));
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    pub(crate) fn clear_children(&self) {
        let children = core::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    pub(crate) fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                upsert(attributes, name, value);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::invalid("text nodes have no attributes")),
        }
    }

    pub(crate) fn set_property(&self, property: Property, value: &str) -> Result<(), DomError> {
        if property == Property::TextContent {
            self.clear_children();
            if !value.is_empty() {
                self.append_child(&Self::new(NodeKind::Text(value.to_owned())))?;
            }
            return Ok(());
        }
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element {
                attributes,
                properties,
                ..
            } => {
                match property.reflected_attribute() {
                    Some(attribute) => upsert(attributes, attribute, value),
                    None => upsert(properties, property.key(), value),
                }
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::invalid("text nodes have no properties")),
        }
    }

    pub(crate) fn add_listener(&self, event: &str, handler: EventHandler) {
        self.0
            .borrow_mut()
            .listeners
            .push((event.to_owned(), handler));
    }
}

impl fmt::Debug for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Element {
                tag, attributes, ..
            } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attributes", attributes)
                .field("children", &data.children)
                .finish(),
            NodeKind::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

fn lookup(entries: &[(String, String)], name: &str) -> Option<String> {
    entries
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    match entries.iter_mut().find(|(key, _)| key == name) {
        Some((_, slot)) => value.clone_into(slot),
        None => entries.push((name.to_owned(), value.to_owned())),
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

struct DocumentState {
    body: VirtualNode,
    hash: String,
    hash_listeners: Vec<HashListener>,
}

/// In-memory document with a `<body>` root and a location hash.
///
/// Cloning yields another handle to the same document.
#[derive(Clone)]
pub struct VirtualDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// Creates an empty document with no hash.
    #[must_use]
    pub fn new() -> Self {
        let body = VirtualNode::new(NodeKind::Element {
            tag: "body".to_owned(),
            attributes: Vec::new(),
            properties: Vec::new(),
        });
        Self {
            state: Rc::new(RefCell::new(DocumentState {
                body,
                hash: String::new(),
                hash_listeners: Vec::new(),
            })),
        }
    }

    /// The `<body>` element; nodes are only discoverable by id once attached
    /// beneath it.
    #[must_use]
    pub fn body(&self) -> VirtualNode {
        self.state.borrow().body.clone()
    }

    /// The current `location.hash`, including the leading `#` when non-empty.
    #[must_use]
    pub fn hash(&self) -> String {
        self.state.borrow().hash.clone()
    }

    /// Assigns `location.hash`. A change fires every `hashchange` listener
    /// synchronously; assigning the current value is a no-op.
    pub fn set_hash(&self, hash: &str) {
        let fragment = hash.strip_prefix('#').unwrap_or(hash);
        let normalized = if fragment.is_empty() {
            String::new()
        } else {
            format!("#{fragment}")
        };
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.hash == normalized {
                return;
            }
            state.hash = normalized;
            state.hash_listeners.clone()
        };
        for listener in listeners {
            listener();
        }
    }

    /// Number of registered `hashchange` listeners.
    #[must_use]
    pub fn hash_listener_count(&self) -> usize {
        self.state.borrow().hash_listeners.len()
    }

    pub(crate) fn on_hash_change(&self, listener: HashListener) {
        self.state.borrow_mut().hash_listeners.push(listener);
    }

    pub(crate) fn create_element(&self, tag: &str) -> Result<VirtualNode, DomError> {
        if !is_valid_tag(tag) {
            return Err(DomError::invalid(format!("`{tag}` is not a valid tag name")));
        }
        Ok(VirtualNode::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            properties: Vec::new(),
        }))
    }

    #[allow(clippy::unused_self)]
    pub(crate) fn create_text_node(&self, text: &str) -> VirtualNode {
        VirtualNode::new(NodeKind::Text(text.to_owned()))
    }

    pub(crate) fn get_element_by_id(&self, id: &str) -> Option<VirtualNode> {
        self.body().find_by_id(id)
    }
}

impl fmt::Debug for VirtualDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualDocument")
            .field("hash", &state.hash)
            .field("body", &state.body)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::VirtualDocument;
    use crate::props::Property;

    #[test]
    fn appending_moves_nodes_between_parents() {
        let document = VirtualDocument::new();
        let first = document.create_element("div").expect("element");
        let second = document.create_element("div").expect("element");
        let item = document.create_text_node("x");

        first.append_child(&item).expect("append");
        second.append_child(&item).expect("append");

        assert!(first.children().is_empty());
        assert_eq!(second.children().len(), 1);
        assert!(item.parent().is_some_and(|p| p.ptr_eq(&second)));
    }

    #[test]
    fn cycles_are_rejected() {
        let document = VirtualDocument::new();
        let outer = document.create_element("div").expect("element");
        let inner = document.create_element("span").expect("element");
        outer.append_child(&inner).expect("append");
        assert!(inner.append_child(&outer).is_err());
        assert!(outer.append_child(&outer).is_err());
    }

    #[test]
    fn lookup_by_id_only_sees_attached_nodes() {
        let document = VirtualDocument::new();
        let node = document.create_element("main").expect("element");
        node.set_property(Property::Id, "app").expect("id");
        assert!(document.get_element_by_id("app").is_none());

        document.body().append_child(&node).expect("append");
        let found = document.get_element_by_id("app").expect("attached");
        assert!(found.ptr_eq(&node));
    }

    #[test]
    fn hash_changes_notify_once_per_change() {
        let document = VirtualDocument::new();
        let fired = Rc::new(Cell::new(0));
        document.on_hash_change({
            let fired = Rc::clone(&fired);
            Rc::new(move || fired.set(fired.get() + 1))
        });

        document.set_hash("/about");
        assert_eq!(document.hash(), "#/about");
        document.set_hash("#/about");
        assert_eq!(fired.get(), 1);

        document.set_hash("");
        assert_eq!(document.hash(), "");
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn text_content_property_replaces_children() {
        let document = VirtualDocument::new();
        let node = document.create_element("p").expect("element");
        node.append_child(&document.create_text_node("old"))
            .expect("append");
        node.set_property(Property::TextContent, "new").expect("text");
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.text_content(), "new");
    }

    #[test]
    fn invalid_tag_names_are_rejected() {
        let document = VirtualDocument::new();
        assert!(document.create_element("my div").is_err());
        assert!(document.create_element("1div").is_err());
        assert_eq!(
            document.create_element("DIV").expect("element").tag_name().as_deref(),
            Some("div")
        );
    }
}

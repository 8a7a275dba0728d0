//! Declarative element construction.
//!
//! [`ElementBuilder::build`] turns a tag name, an options map and a children
//! value into a node tree:
//!
//! ```
//! use hashkit_core::{Child, Document, ElementBuilder, Props};
//!
//! let builder = ElementBuilder::new(Document::in_memory());
//! let item = builder.build("li", Props::new().class("done"), "ship it")?;
//! let list = builder.build("ul", vec![Child::from(item), Child::from("next")], ())?;
//! # Ok::<(), hashkit_core::DomError>(())
//! ```

use crate::document::{Document, Node};
use crate::error::DomError;
use crate::props::{PropValue, Property, Props, format_number};

/// A children value: text, a number, a node, or a nested sequence of these.
#[derive(Debug, Clone)]
pub enum Child {
    /// Appended as a text node.
    Text(String),
    /// Appended as a text node holding the number's string form.
    Number(f64),
    /// Appended as-is.
    Node(Node),
    /// Flattened depth-first.
    List(Vec<Child>),
}

impl Child {
    /// No children.
    #[must_use]
    pub const fn none() -> Self {
        Self::List(Vec::new())
    }
}

impl Default for Child {
    fn default() -> Self {
        Self::none()
    }
}

impl From<()> for Child {
    fn from((): ()) -> Self {
        Self::none()
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Child {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for Child {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// The second positional argument of [`ElementBuilder::build`]: either an
/// options map or, when the options are omitted, the children value.
#[derive(Debug, Clone)]
pub enum Arg {
    /// An options map.
    Props(Props),
    /// A children value standing in for omitted options.
    Children(Child),
}

impl From<()> for Arg {
    fn from((): ()) -> Self {
        Self::Props(Props::new())
    }
}

impl From<Props> for Arg {
    fn from(value: Props) -> Self {
        Self::Props(value)
    }
}

impl From<Child> for Arg {
    fn from(value: Child) -> Self {
        Self::Children(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Children(value.into())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Children(value.into())
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Self::Children(value.into())
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Children(value.into())
    }
}

impl From<Node> for Arg {
    fn from(value: Node) -> Self {
        Self::Children(value.into())
    }
}

impl<T: Into<Child>> From<Vec<T>> for Arg {
    fn from(value: Vec<T>) -> Self {
        Self::Children(value.into())
    }
}

impl<T: Into<Child>, const N: usize> From<[T; N]> for Arg {
    fn from(value: [T; N]) -> Self {
        Self::Children(value.into())
    }
}

/// How one options entry is applied to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Listener,
    Class,
    Property(Property),
    Attribute,
}

type Matcher = fn(&str, &str, &PropValue) -> Option<Rule>;

/// Precedence of the rules, first match wins.
const RULES: [Matcher; 4] = [listener, class, property, attribute];

fn listener(_tag: &str, key: &str, value: &PropValue) -> Option<Rule> {
    (value.is_handler() && key.starts_with("on")).then_some(Rule::Listener)
}

fn class(_tag: &str, key: &str, _value: &PropValue) -> Option<Rule> {
    (key == "class").then_some(Rule::Class)
}

fn property(tag: &str, key: &str, _value: &PropValue) -> Option<Rule> {
    Property::lookup(tag, key).map(Rule::Property)
}

const fn attribute(_tag: &str, _key: &str, _value: &PropValue) -> Option<Rule> {
    Some(Rule::Attribute)
}

fn classify(tag: &str, key: &str, value: &PropValue) -> Rule {
    RULES
        .iter()
        .find_map(|rule| rule(tag, key, value))
        .unwrap_or(Rule::Attribute)
}

/// Builds element trees in a [`Document`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    document: Document,
}

impl ElementBuilder {
    /// Creates a builder that creates nodes in `document`.
    #[must_use]
    pub const fn new(document: Document) -> Self {
        Self { document }
    }

    /// Returns the document nodes are created in.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Builds `<tag>` with the given options and children.
    ///
    /// When `arg` is a children value the options default to empty and
    /// `children` is ignored, so `build("div", ["x", "y"], ())` and
    /// `build("div", (), ["x", "y"])` produce the same tree.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] for an empty tag name, a handler
    /// under a key without the `on` prefix, or a node that belongs to another
    /// host. Host failures are propagated.
    pub fn build(
        &self,
        tag: &str,
        arg: impl Into<Arg>,
        children: impl Into<Child>,
    ) -> Result<Node, DomError> {
        if tag.is_empty() {
            return Err(DomError::invalid("tag name must be a non-empty string"));
        }
        let (props, children) = match arg.into() {
            Arg::Props(props) => (props, children.into()),
            Arg::Children(children) => (Props::new(), children),
        };

        let node = self.document.create_element(tag)?;
        self.apply_props(&node, tag, &props)?;
        self.append_children(&node, children)?;
        Ok(node)
    }

    /// Builds `<tag>` with no options and no children.
    ///
    /// # Errors
    ///
    /// See [`Self::build`].
    pub fn element(&self, tag: &str) -> Result<Node, DomError> {
        self.build(tag, (), ())
    }

    fn apply_props(&self, node: &Node, tag: &str, props: &Props) -> Result<(), DomError> {
        for (key, value) in props.iter() {
            match (classify(tag, key, value), value) {
                (Rule::Listener, PropValue::Handler(handler)) => {
                    let event = key["on".len()..].to_lowercase();
                    tracing::trace!(tag, event = %event, "registering listener");
                    self.document
                        .add_event_listener(node, &event, handler.clone())?;
                }
                (Rule::Class, value) => {
                    self.document
                        .set_attribute(node, "class", &coerce(key, value)?)?;
                }
                (Rule::Property(property), value) => {
                    self.document.set_property(node, property, value)?;
                }
                (_, value) => {
                    self.document.set_attribute(node, key, &coerce(key, value)?)?;
                }
            }
        }
        Ok(())
    }

    fn append_children(&self, parent: &Node, children: Child) -> Result<(), DomError> {
        match children {
            Child::List(items) => {
                for item in items {
                    self.append_children(parent, item)?;
                }
                Ok(())
            }
            Child::Node(node) => self.document.append_child(parent, &node),
            Child::Text(text) => {
                let text = self.document.create_text_node(&text);
                self.document.append_child(parent, &text)
            }
            Child::Number(number) => {
                let text = self.document.create_text_node(&format_number(number));
                self.document.append_child(parent, &text)
            }
        }
    }
}

fn coerce(key: &str, value: &PropValue) -> Result<String, DomError> {
    value.coerce().ok_or_else(|| {
        DomError::invalid(format!(
            "event handler under `{key}` needs an `on`-prefixed key"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Child, ElementBuilder, Rule, classify};
    use crate::document::Document;
    use crate::error::DomError;
    use crate::event::handler;
    use crate::props::{PropValue, Property, Props};
    use crate::virtual_dom::VirtualNode;

    fn builder() -> ElementBuilder {
        ElementBuilder::new(Document::in_memory())
    }

    fn texts(node: &VirtualNode) -> Vec<String> {
        node.children()
            .iter()
            .filter(|child| child.is_text())
            .map(VirtualNode::text_content)
            .collect()
    }

    #[test]
    fn class_and_text_child() {
        let node = builder()
            .build("div", Props::new().class("a"), "hi")
            .expect("build");
        let node = node.as_virtual().expect("virtual");
        assert_eq!(node.tag_name().as_deref(), Some("div"));
        assert_eq!(node.attribute("class").as_deref(), Some("a"));
        assert_eq!(texts(node), ["hi"]);
    }

    #[test]
    fn children_in_options_position() {
        let node = builder().build("div", ["x", "y"], ()).expect("build");
        let node = node.as_virtual().expect("virtual");
        assert_eq!(texts(node), ["x", "y"]);
        assert!(node.attribute("class").is_none());
    }

    #[test]
    fn children_in_options_position_ignore_third_argument() {
        let node = builder().build("p", "first", "ignored").expect("build");
        assert_eq!(node.as_virtual().expect("virtual").text_content(), "first");
    }

    #[test]
    fn empty_tag_is_rejected() {
        let error = builder().build("", (), ()).unwrap_err();
        assert!(matches!(error, DomError::InvalidArgument(_)));
    }

    #[test]
    fn nested_children_flatten_depth_first() {
        let builder = builder();
        let span = builder.build("span", (), "c").expect("span");
        let children = Child::List(vec![
            Child::from("a"),
            Child::List(vec![Child::from(1), Child::from(span)]),
            Child::from(2.5),
        ]);
        let node = builder.build("div", (), children).expect("build");
        let node = node.as_virtual().expect("virtual");
        let kids = node.children();
        assert_eq!(kids.len(), 4);
        assert_eq!(kids[0].text_content(), "a");
        assert_eq!(kids[1].text_content(), "1");
        assert_eq!(kids[2].tag_name().as_deref(), Some("span"));
        assert_eq!(kids[3].text_content(), "2.5");
    }

    #[test]
    fn listeners_use_lower_cased_event_names() {
        let clicks = Rc::new(RefCell::new(0));
        let props = Props::new().with(
            "onClick",
            handler({
                let clicks = Rc::clone(&clicks);
                move |_| *clicks.borrow_mut() += 1
            }),
        );
        let node = builder().build("button", props, "go").expect("build");
        let node = node.as_virtual().expect("virtual");
        assert_eq!(node.listener_count("click"), 1);
        assert!(node.attribute("onClick").is_none());

        node.dispatch("click");
        node.dispatch("click");
        assert_eq!(*clicks.borrow(), 2);
    }

    #[test]
    fn precedence_is_listener_class_property_attribute() {
        let f = PropValue::Handler(handler(|_| {}));
        let text = PropValue::from("x");
        assert_eq!(classify("a", "onclick", &f), Rule::Listener);
        assert_eq!(classify("a", "onclick", &text), Rule::Attribute);
        assert_eq!(classify("a", "class", &text), Rule::Class);
        assert_eq!(
            classify("a", "href", &text),
            Rule::Property(Property::Href)
        );
        assert_eq!(
            classify("INPUT", "value", &text),
            Rule::Property(Property::Value)
        );
        assert_eq!(classify("div", "href", &text), Rule::Attribute);
        assert_eq!(classify("div", "data-id", &text), Rule::Attribute);
    }

    #[test]
    fn properties_and_attributes_are_applied() {
        let props = Props::new()
            .id("main")
            .with("value", "typed")
            .with("disabled", true)
            .with("data-count", 3)
            .with("aria-label", "field");
        let node = builder().build("input", props, ()).expect("build");
        let node = node.as_virtual().expect("virtual");
        assert_eq!(node.attribute("id").as_deref(), Some("main"));
        assert_eq!(node.property("value").as_deref(), Some("typed"));
        assert!(node.attribute("value").is_none());
        assert_eq!(node.property("disabled").as_deref(), Some("true"));
        assert_eq!(node.attribute("data-count").as_deref(), Some("3"));
        assert_eq!(node.attribute("aria-label").as_deref(), Some("field"));
    }

    #[test]
    fn handler_without_on_prefix_is_rejected() {
        let props = Props::new().with("click", handler(|_| {}));
        let error = builder().build("div", props, ()).unwrap_err();
        assert!(matches!(error, DomError::InvalidArgument(_)));
    }

    #[test]
    fn existing_nodes_are_moved_not_copied() {
        let builder = builder();
        let shared = builder.build("em", (), "!").expect("em");
        let first = builder.build("p", (), shared.clone()).expect("first");
        let second = builder.build("p", (), shared).expect("second");
        assert!(first.as_virtual().expect("virtual").children().is_empty());
        assert_eq!(second.as_virtual().expect("virtual").text_content(), "!");
    }
}

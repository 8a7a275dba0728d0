//! Attribute and event maps passed to the element builder.

use core::fmt;

use crate::event::{Event, EventHandler, handler};

/// A single value in an element's options map.
#[derive(Clone)]
pub enum PropValue {
    /// Plain text.
    Text(String),
    /// A number, coerced with the host language's number formatting.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// An event listener; only meaningful under an `on`-prefixed key.
    Handler(EventHandler),
}

impl PropValue {
    /// Returns `true` for [`PropValue::Handler`].
    #[must_use]
    pub const fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }

    /// String-coerces the value. Handlers have no string form.
    #[must_use]
    pub fn coerce(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Handler(_) => None,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Number(number) => f.debug_tuple("Number").field(number).finish(),
            Self::Bool(flag) => f.debug_tuple("Bool").field(flag).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

/// Formats a number the way JavaScript's `String(number)` does: shortest
/// round-trip digits, plain decimal notation for magnitudes in `[1e-6, 1e21)`
/// and exponent notation with an explicit sign outside it.
pub(crate) fn format_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if number == 0.0 {
        return "0".to_owned();
    }
    if (1e-6..1e21).contains(&number.abs()) {
        return format!("{number}");
    }
    let formatted = format!("{number:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// Ordered attribute/event map for [`ElementBuilder::build`](crate::ElementBuilder::build).
///
/// Inserting an existing key replaces its value but keeps the key's original
/// position.
#[derive(Clone, Default)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets the `class` entry.
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.with("class", class.into())
    }

    /// Sets the `id` entry.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("id", id.into())
    }

    /// Registers a listener for `event` under the key `on{event}`.
    #[must_use]
    pub fn on(self, event: &str, f: impl Fn(&Event) + 'static) -> Self {
        self.with(format!("on{event}"), handler(f))
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut props = Self::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}

/// Element properties that may be assigned directly instead of through
/// `setAttribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// `id`
    Id,
    /// `title`
    Title,
    /// `hidden`
    Hidden,
    /// `tabIndex`
    TabIndex,
    /// `lang`
    Lang,
    /// `dir`
    Dir,
    /// `style` (assigning a string sets the inline declaration text)
    Style,
    /// `textContent`
    TextContent,
    /// `value`
    Value,
    /// `checked`
    Checked,
    /// `selected`
    Selected,
    /// `disabled`
    Disabled,
    /// `name`
    Name,
    /// `type`
    Type,
    /// `placeholder`
    Placeholder,
    /// `href`
    Href,
    /// `src`
    Src,
    /// `alt`
    Alt,
    /// `htmlFor`
    HtmlFor,
}

/// One allow-list entry. Empty `tags` means the key is settable on every
/// element; `attribute` names the reflected content attribute, if any.
struct PropertySpec {
    property: Property,
    key: &'static str,
    tags: &'static [&'static str],
    attribute: Option<&'static str>,
}

#[rustfmt::skip]
const PROPERTIES: &[PropertySpec] = &[
    PropertySpec { property: Property::Id, key: "id", tags: &[], attribute: Some("id") },
    PropertySpec { property: Property::Title, key: "title", tags: &[], attribute: Some("title") },
    PropertySpec { property: Property::Hidden, key: "hidden", tags: &[], attribute: None },
    PropertySpec { property: Property::TabIndex, key: "tabIndex", tags: &[], attribute: Some("tabindex") },
    PropertySpec { property: Property::Lang, key: "lang", tags: &[], attribute: Some("lang") },
    PropertySpec { property: Property::Dir, key: "dir", tags: &[], attribute: Some("dir") },
    PropertySpec { property: Property::Style, key: "style", tags: &[], attribute: Some("style") },
    PropertySpec { property: Property::TextContent, key: "textContent", tags: &[], attribute: None },
    PropertySpec { property: Property::Value, key: "value", tags: &["input", "textarea", "select", "option", "button", "li", "output", "progress", "meter", "data"], attribute: None },
    PropertySpec { property: Property::Checked, key: "checked", tags: &["input"], attribute: None },
    PropertySpec { property: Property::Selected, key: "selected", tags: &["option"], attribute: None },
    PropertySpec { property: Property::Disabled, key: "disabled", tags: &["input", "textarea", "select", "button", "option", "optgroup", "fieldset"], attribute: None },
    PropertySpec { property: Property::Name, key: "name", tags: &["input", "textarea", "select", "button", "form", "iframe", "output", "fieldset", "meta", "slot"], attribute: Some("name") },
    PropertySpec { property: Property::Type, key: "type", tags: &["input", "button", "script", "style", "link", "ol", "source", "embed", "object"], attribute: Some("type") },
    PropertySpec { property: Property::Placeholder, key: "placeholder", tags: &["input", "textarea"], attribute: Some("placeholder") },
    PropertySpec { property: Property::Href, key: "href", tags: &["a", "area", "link", "base"], attribute: Some("href") },
    PropertySpec { property: Property::Src, key: "src", tags: &["img", "script", "iframe", "input", "video", "audio", "source", "embed", "track"], attribute: Some("src") },
    PropertySpec { property: Property::Alt, key: "alt", tags: &["img", "area", "input"], attribute: Some("alt") },
    PropertySpec { property: Property::HtmlFor, key: "htmlFor", tags: &["label", "output"], attribute: Some("for") },
];

impl Property {
    /// Resolves `key` to a property settable on elements named `tag`.
    #[must_use]
    pub fn lookup(tag: &str, key: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        PROPERTIES
            .iter()
            .find(|spec| {
                spec.key == key && (spec.tags.is_empty() || spec.tags.contains(&tag.as_str()))
            })
            .map(|spec| spec.property)
    }

    /// The JavaScript property name.
    #[must_use]
    pub fn key(self) -> &'static str {
        PROPERTIES
            .iter()
            .find(|spec| spec.property == self)
            .map_or("", |spec| spec.key)
    }

    /// The content attribute this property reflects, if any.
    #[must_use]
    pub fn reflected_attribute(self) -> Option<&'static str> {
        PROPERTIES
            .iter()
            .find(|spec| spec.property == self)
            .and_then(|spec| spec.attribute)
    }
}

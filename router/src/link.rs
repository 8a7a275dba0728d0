//! Hash links that navigate without reloading the page.

use hashkit_core::{Child, DomError, ElementBuilder, Node, Props};

/// Class added to a link whose target is the current hash.
pub const ACTIVE_CLASS: &str = "active";

/// Builder for an `<a>` element pointing at a router path.
///
/// The rendered element has `href="#<path>"`. Clicking it suppresses the
/// browser's default navigation and assigns the hash instead, which the
/// router picks up through `hashchange`. Whether the link is active is
/// decided once, when it is built.
#[derive(Debug, Clone)]
pub struct Link {
    href: String,
    props: Props,
    children: Child,
    active_class: String,
}

impl Link {
    /// Creates a link to `href`, a router path such as `/about`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            props: Props::new(),
            children: Child::none(),
            active_class: ACTIVE_CLASS.to_owned(),
        }
    }

    /// Extra options applied after the link's own `href` and click handler.
    #[must_use]
    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    /// Link content.
    #[must_use]
    pub fn children(mut self, children: impl Into<Child>) -> Self {
        self.children = children.into();
        self
    }

    /// Overrides the class added while the link is active.
    #[must_use]
    pub fn active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    /// Builds the `<a>` element in `builder`'s document.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] when the caller's `class` is a
    /// handler, and propagates any error from [`ElementBuilder::build`].
    pub fn build(self, builder: &ElementBuilder) -> Result<Node, DomError> {
        let Self {
            href,
            mut props,
            children,
            active_class,
        } = self;
        let document = builder.document().clone();

        let caller_class = match props.remove("class") {
            Some(value) => Some(value.coerce().ok_or_else(|| {
                DomError::InvalidArgument("link class must not be an event handler".to_owned())
            })?),
            None => None,
        };
        let active = document.hash_fragment()? == href;
        let class = [
            active.then_some(active_class.as_str()),
            caller_class.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let target = href.clone();
        let mut merged = Props::new()
            .with("href", format!("#{href}"))
            .on("click", move |event| {
                event.prevent_default();
                if let Err(error) = document.set_hash(&target) {
                    tracing::error!(%error, href = %target, "failed to navigate");
                }
            });
        if !class.is_empty() {
            merged.insert("class", class);
        }
        for (key, value) in props.iter() {
            merged.insert(key, value.clone());
        }

        tracing::trace!(%href, active, "built link");
        builder.build("a", merged, children)
    }
}

/// Builds a hash link to `href` with the default active class.
///
/// # Errors
///
/// See [`Link::build`].
pub fn link(
    builder: &ElementBuilder,
    href: &str,
    props: Props,
    children: impl Into<Child>,
) -> Result<Node, DomError> {
    Link::new(href).props(props).children(children).build(builder)
}

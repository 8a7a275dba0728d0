//! A hashkit application: one document, one element builder, one state store.

use std::rc::Rc;

use hashkit_core::{Child, Document, DomError, ElementBuilder, Node, Props};
use hashkit_router::{DEFAULT_CONTAINER_ID, Router, RouterError, Routes, init_router, link};
use hashkit_state::{StateError, StateManager, StorageBackend};
use thiserror::Error;

/// Errors raised while assembling an [`App`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The document could not be bound or prepared.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// The storage backend could not be bound.
    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    Browser,
    InMemory,
}

/// Builder for [`App`].
#[derive(Debug)]
pub struct AppBuilder {
    root_id: String,
    host: Host,
    state: Option<StateManager>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Creates a builder bound to the browser document and `localStorage`,
    /// rendering routes into `#app`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root_id: DEFAULT_CONTAINER_ID.to_owned(),
            host: Host::Browser,
            state: None,
        }
    }

    /// Creates a builder over an in-memory document and in-memory storage.
    ///
    /// The built document already contains the root container, so routers
    /// can be mounted straight away.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            host: Host::InMemory,
            ..Self::new()
        }
    }

    /// Sets the id of the element routes render into.
    #[must_use]
    pub fn with_root_id(mut self, id: impl Into<String>) -> Self {
        self.root_id = id.into();
        self
    }

    /// Persists state in `backend` instead of the host default.
    #[must_use]
    pub fn with_storage(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.state = Some(StateManager::new(backend));
        self
    }

    /// Finalises the builder and creates an [`App`].
    ///
    /// # Errors
    ///
    /// For the browser host, fails off `wasm32` or when the document or
    /// `localStorage` is unavailable.
    pub fn build(self) -> Result<App, AppError> {
        let document = match self.host {
            Host::Browser => Document::browser()?,
            Host::InMemory => Document::in_memory(),
        };
        let state = match (self.state, self.host) {
            (Some(state), _) => state,
            (None, Host::Browser) => StateManager::local()?,
            (None, Host::InMemory) => StateManager::in_memory(),
        };
        let elements = ElementBuilder::new(document.clone());

        if let Some(virtual_document) = document.as_virtual() {
            let root = elements.build("div", Props::new().id(self.root_id.as_str()), ())?;
            document.append_child(&Node::from(virtual_document.body()), &root)?;
        }

        tracing::debug!(root_id = %self.root_id, "app created");
        Ok(App {
            document,
            elements,
            state: Rc::new(state),
            root_id: self.root_id,
        })
    }
}

/// The pieces a page needs, created once and passed around explicitly.
#[derive(Debug, Clone)]
pub struct App {
    document: Document,
    elements: ElementBuilder,
    state: Rc<StateManager>,
    root_id: String,
}

impl App {
    /// Creates an app with the default browser configuration.
    ///
    /// # Errors
    ///
    /// See [`AppBuilder::build`].
    pub fn new() -> Result<Self, AppError> {
        AppBuilder::new().build()
    }

    /// The host document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The element builder bound to [`Self::document`].
    #[must_use]
    pub const fn elements(&self) -> &ElementBuilder {
        &self.elements
    }

    /// The shared state store.
    #[must_use]
    pub const fn state(&self) -> &Rc<StateManager> {
        &self.state
    }

    /// Id of the element routes render into.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Builds `<tag>`; shorthand for [`ElementBuilder::build`].
    ///
    /// # Errors
    ///
    /// See [`ElementBuilder::build`].
    pub fn element(
        &self,
        tag: &str,
        arg: impl Into<hashkit_core::Arg>,
        children: impl Into<Child>,
    ) -> Result<Node, DomError> {
        self.elements.build(tag, arg, children)
    }

    /// Builds a hash link; shorthand for [`hashkit_router::link`].
    ///
    /// # Errors
    ///
    /// See [`hashkit_router::Link::build`].
    pub fn link(
        &self,
        href: &str,
        props: Props,
        children: impl Into<Child>,
    ) -> Result<Node, DomError> {
        link(&self.elements, href, props, children)
    }

    /// Mounts `routes` on the root element and renders the current hash.
    ///
    /// # Errors
    ///
    /// See [`hashkit_router::RouterBuilder::mount`].
    pub fn router(&self, routes: Routes) -> Result<Router, RouterError> {
        init_router(&self.document, routes, &self.root_id)
    }
}

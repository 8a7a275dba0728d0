use core::fmt;
use std::rc::Rc;

use hashkit_core::{Document, DomError, Node};
use thiserror::Error;

/// Id of the container element used when none is configured.
pub const DEFAULT_CONTAINER_ID: &str = "app";

/// Route key consulted when no route matches the current path exactly.
pub const FALLBACK_ROUTE: &str = "*";

/// Path rendered when the hash is empty.
pub const ROOT_PATH: &str = "/";

/// A render function producing the content for one route.
pub type RouteFn = Rc<dyn Fn() -> Result<Node, DomError>>;

/// Errors returned by [`init_router`] and [`Router::render`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A document operation failed, including a missing container element.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Neither an exact route nor the `*` fallback exists for the path.
    #[error("no route matches `{0}` and no `*` fallback is registered")]
    NoRoute(String),
}

/// Route table mapping hash paths to render functions.
///
/// Registering the same path twice replaces the earlier function.
#[derive(Clone, Default)]
pub struct Routes {
    entries: Vec<(String, RouteFn)>,
}

impl Routes {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a route, builder style.
    #[must_use]
    pub fn route<F>(mut self, path: impl Into<String>, render: F) -> Self
    where
        F: Fn() -> Result<Node, DomError> + 'static,
    {
        self.insert(path, render);
        self
    }

    /// Adds the `*` fallback route, builder style.
    #[must_use]
    pub fn fallback<F>(self, render: F) -> Self
    where
        F: Fn() -> Result<Node, DomError> + 'static,
    {
        self.route(FALLBACK_ROUTE, render)
    }

    /// Inserts or replaces a route.
    pub fn insert<F>(&mut self, path: impl Into<String>, render: F)
    where
        F: Fn() -> Result<Node, DomError> + 'static,
    {
        let path = path.into();
        let render: RouteFn = Rc::new(render);
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, slot)) => *slot = render,
            None => self.entries.push((path, render)),
        }
    }

    /// Returns the route registered under exactly `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RouteFn> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, render)| render)
    }

    /// Returns the route for `path`, falling back to `*`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteFn> {
        self.get(path).or_else(|| self.get(FALLBACK_ROUTE))
    }

    /// Registered paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    /// Number of registered routes, including the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.paths()).finish()
    }
}

struct RouterInner {
    document: Document,
    container: Node,
    routes: Routes,
}

/// A mounted router.
///
/// The `hashchange` subscription made at mount time lives for the rest of the
/// page, whether or not this handle is kept. Keep the handle to trigger
/// [`Router::render`] manually, e.g. after changing state the current route
/// reads.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Re-renders the route matching the current hash into the container.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NoRoute`] when nothing matches (the container
    /// is left empty) and propagates document and route failures.
    pub fn render(&self) -> Result<(), RouterError> {
        let path = self.current_path()?;
        let inner = &self.inner;
        let route = inner.routes.resolve(&path).cloned();
        inner.document.clear_children(&inner.container)?;

        let Some(route) = route else {
            tracing::warn!(%path, "no route matched");
            return Err(RouterError::NoRoute(path));
        };
        if inner.routes.get(&path).is_none() {
            tracing::debug!(%path, "rendering fallback route");
        }
        let node = route()?;
        inner.document.append_child(&inner.container, &node)?;
        tracing::debug!(%path, "rendered route");
        Ok(())
    }

    /// The path the router currently matches against: the hash without its
    /// leading `#`, or `/` when the hash is empty.
    ///
    /// # Errors
    ///
    /// Fails when the location cannot be read.
    pub fn current_path(&self) -> Result<String, DomError> {
        let fragment = self.inner.document.hash_fragment()?;
        Ok(if fragment.is_empty() {
            ROOT_PATH.to_owned()
        } else {
            fragment
        })
    }

    /// Navigates to `path` by assigning the hash; the `hashchange`
    /// subscription performs the render.
    ///
    /// # Errors
    ///
    /// Fails when the location cannot be written.
    pub fn navigate(&self, path: &str) -> Result<(), DomError> {
        self.inner.document.set_hash(path)
    }

    /// The element routes render into.
    #[must_use]
    pub fn container(&self) -> &Node {
        &self.inner.container
    }

    /// The route table.
    #[must_use]
    pub fn routes(&self) -> &Routes {
        &self.inner.routes
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("container", &self.inner.container)
            .field("routes", &self.inner.routes)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Router`].
#[derive(Debug, Clone)]
pub struct RouterBuilder {
    document: Document,
    container_id: String,
    routes: Routes,
}

impl RouterBuilder {
    /// Creates a builder rendering into `#app` of `document`.
    #[must_use]
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
            container_id: DEFAULT_CONTAINER_ID.to_owned(),
            routes: Routes::new(),
        }
    }

    /// Sets the id of the container element.
    #[must_use]
    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Replaces the route table.
    #[must_use]
    pub fn with_routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route<F>(mut self, path: impl Into<String>, render: F) -> Self
    where
        F: Fn() -> Result<Node, DomError> + 'static,
    {
        self.routes.insert(path, render);
        self
    }

    /// Adds the `*` fallback route.
    #[must_use]
    pub fn fallback<F>(self, render: F) -> Self
    where
        F: Fn() -> Result<Node, DomError> + 'static,
    {
        self.route(FALLBACK_ROUTE, render)
    }

    /// Looks up the container, subscribes to `hashchange` and renders the
    /// current hash once.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] when no element with the configured id
    /// is attached, and any error from the first render.
    pub fn mount(self) -> Result<Router, RouterError> {
        let container = self
            .document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| DomError::NotFound(self.container_id.clone()))?;

        let router = Router {
            inner: Rc::new(RouterInner {
                document: self.document,
                container,
                routes: self.routes,
            }),
        };

        let listener = router.clone();
        router.inner.document.on_hash_change(Rc::new(move || {
            if let Err(error) = listener.render() {
                tracing::error!(%error, "failed to render route after hash change");
            }
        }))?;
        tracing::debug!(container = %self.container_id, "router mounted");

        router.render()?;
        Ok(router)
    }
}

/// Mounts `routes` on the element with id `container_id` and renders the
/// current hash.
///
/// # Errors
///
/// See [`RouterBuilder::mount`].
pub fn init_router(
    document: &Document,
    routes: Routes,
    container_id: &str,
) -> Result<Router, RouterError> {
    RouterBuilder::new(document)
        .with_container_id(container_id)
        .with_routes(routes)
        .mount()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use hashkit_core::{Document, DomError, ElementBuilder, Node, Props};

    use super::{DEFAULT_CONTAINER_ID, RouterBuilder, RouterError, Routes, init_router};

    fn document_with_container(id: &str) -> Document {
        let document = Document::in_memory();
        let builder = ElementBuilder::new(document.clone());
        let container = builder
            .build("div", Props::new().id(id), ())
            .expect("container");
        let body = document.as_virtual().expect("virtual").body();
        document
            .append_child(&Node::from(body), &container)
            .expect("attach");
        document
    }

    fn text_of(node: &Node) -> String {
        node.as_virtual().expect("virtual").text_content()
    }

    type Calls = Rc<RefCell<Vec<&'static str>>>;

    fn page(
        document: &Document,
        calls: &Calls,
        name: &'static str,
    ) -> impl Fn() -> Result<Node, DomError> + 'static {
        let builder = ElementBuilder::new(document.clone());
        let calls = Rc::clone(calls);
        move || {
            calls.borrow_mut().push(name);
            builder.build("section", (), name)
        }
    }

    #[test]
    fn empty_hash_renders_root() {
        let document = document_with_container(DEFAULT_CONTAINER_ID);
        let calls = Calls::default();
        let routes = Routes::new()
            .route("/", page(&document, &calls, "home"))
            .fallback(page(&document, &calls, "missing"));

        let router = init_router(&document, routes, DEFAULT_CONTAINER_ID).expect("mount");

        assert_eq!(*calls.borrow(), ["home"]);
        assert_eq!(text_of(router.container()), "home");
        assert_eq!(router.current_path().expect("path"), "/");
    }

    #[test]
    fn unknown_paths_use_fallback_and_manual_render_repeats() {
        let document = document_with_container("app");
        let calls = Calls::default();
        let router = RouterBuilder::new(&document)
            .route("/", page(&document, &calls, "home"))
            .fallback(page(&document, &calls, "missing"))
            .mount()
            .expect("mount");

        document.set_hash("/missing").expect("hash");
        assert_eq!(*calls.borrow(), ["home", "missing"]);
        assert_eq!(text_of(router.container()), "missing");

        router.render().expect("render");
        assert_eq!(*calls.borrow(), ["home", "missing", "missing"]);
        // The container is cleared before every render.
        let container = router.container().as_virtual().expect("virtual");
        assert_eq!(container.children().len(), 1);
    }

    #[test]
    fn exact_matches_win_over_fallback() {
        let document = document_with_container("root");
        let calls = Calls::default();
        let router = RouterBuilder::new(&document)
            .with_container_id("root")
            .route("/", page(&document, &calls, "home"))
            .route("/about", page(&document, &calls, "about"))
            .fallback(page(&document, &calls, "missing"))
            .mount()
            .expect("mount");

        router.navigate("/about").expect("navigate");
        assert_eq!(router.current_path().expect("path"), "/about");
        assert_eq!(text_of(router.container()), "about");

        router.navigate("/about/team").expect("navigate");
        assert_eq!(text_of(router.container()), "missing");
    }

    #[test]
    fn missing_container_is_fatal() {
        let document = Document::in_memory();
        let error = init_router(&document, Routes::new(), "app").unwrap_err();
        assert_eq!(error, RouterError::Dom(DomError::NotFound("app".into())));
        let virtual_document = document.as_virtual().expect("virtual");
        assert_eq!(virtual_document.hash_listener_count(), 0);
    }

    #[test]
    fn no_match_without_fallback_clears_and_errors() {
        let document = document_with_container("app");
        let calls = Calls::default();
        let router = RouterBuilder::new(&document)
            .route("/", page(&document, &calls, "home"))
            .mount()
            .expect("mount");

        document.as_virtual().expect("virtual").set_hash("/nowhere");
        assert_eq!(text_of(router.container()), "");
        assert_eq!(
            router.render(),
            Err(RouterError::NoRoute("/nowhere".into()))
        );
    }

    #[test]
    fn first_render_errors_are_returned() {
        let document = document_with_container("app");
        let error = init_router(&document, Routes::new(), "app").unwrap_err();
        assert_eq!(error, RouterError::NoRoute("/".into()));
    }

    #[test]
    fn re_registering_a_path_replaces_it() {
        let document = document_with_container("app");
        let calls = Calls::default();
        let routes = Routes::new()
            .route("/", page(&document, &calls, "old"))
            .route("/", page(&document, &calls, "new"));
        assert_eq!(routes.len(), 1);
        let router = init_router(&document, routes, "app").expect("mount");
        assert_eq!(text_of(router.container()), "new");
    }
}

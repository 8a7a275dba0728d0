#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Hash-based client-side routing for `hashkit`.
//!
//! A [`Router`] maps the fragment of `location.hash` to a render function and
//! swaps the output into a container element whenever the hash changes.
//! [`link`] builds anchors that navigate by assigning the hash.
//!
//! ```
//! use hashkit_core::{Document, ElementBuilder, Node, Props};
//! use hashkit_router::{RouterBuilder, link};
//!
//! let document = Document::in_memory();
//! let h = ElementBuilder::new(document.clone());
//! let body = Node::from(document.as_virtual().unwrap().body());
//! document.append_child(&body, &h.build("div", Props::new().id("app"), ()).unwrap()).unwrap();
//!
//! let home = h.clone();
//! let router = RouterBuilder::new(&document)
//!     .route("/", move || home.build("h1", (), "Home"))
//!     .mount()
//!     .unwrap();
//!
//! // An empty hash renders "/" but only a link to "/" built after
//! // navigating there is marked active.
//! assert_eq!(router.current_path().unwrap(), "/");
//! let nav = link(&h, "/", Props::new(), "Home").unwrap();
//! assert_eq!(nav.as_virtual().unwrap().attribute("class"), None);
//!
//! router.navigate("/").unwrap();
//! let nav = link(&h, "/", Props::new(), "Home").unwrap();
//! assert_eq!(nav.as_virtual().unwrap().attribute("class").as_deref(), Some("active"));
//! ```

mod link;
mod router;

pub use link::{ACTIVE_CLASS, Link, link};
pub use router::{
    DEFAULT_CONTAINER_ID, FALLBACK_ROUTE, ROOT_PATH, RouteFn, Router, RouterBuilder, RouterError,
    Routes, init_router,
};

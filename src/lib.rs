#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Small building blocks for single-page browser apps.
//!
//! `hashkit` bundles three pieces that are also usable on their own:
//!
//! - [`dom`]: a declarative element builder over the browser DOM or an
//!   in-memory document.
//! - [`state`]: a `localStorage`-backed key/value store with per-key change
//!   callbacks.
//! - [`router`]: a hash-fragment router and a link helper.
//!
//! [`App`] wires them together for one page and [`logging`] forwards
//! `tracing` output and panics to the browser console.
//!
//! ```
//! use hashkit::prelude::*;
//!
//! let app = AppBuilder::in_memory().build().unwrap();
//! let h = app.elements().clone();
//! let state = app.state().clone();
//!
//! let router = app
//!     .router(
//!         Routes::new()
//!             .route("/", move || {
//!                 let visits = state.update("visits", |n| {
//!                     n.and_then(|n| n.as_i64()).unwrap_or_default() + 1
//!                 });
//!                 h.build("p", (), format!("visit #{visits}"))
//!             })
//!             .fallback({
//!                 let h = app.elements().clone();
//!                 move || h.build("p", (), "not found")
//!             }),
//!     )
//!     .unwrap();
//!
//! app.document().set_hash("/nope").unwrap();
//! let root = router.container().as_virtual().unwrap();
//! assert_eq!(root.text_content(), "not found");
//! ```

mod app;
pub mod logging;

pub use app::{App, AppBuilder, AppError};
pub use hashkit_core as dom;
pub use hashkit_router as router;
pub use hashkit_state as state;

pub mod prelude {
    //! Commonly used types, importable in one `use`.
    //!
    //! ```
    //! use hashkit::prelude::*;
    //!
    //! let h = ElementBuilder::new(Document::in_memory());
    //! let list = h.build("ul", (), [h.build("li", (), "one").unwrap()]).unwrap();
    //! assert_eq!(list.as_virtual().unwrap().children().len(), 1);
    //! ```
    pub use crate::logging::install_logging;
    pub use crate::{App, AppBuilder, AppError};
    pub use hashkit_core::{Child, Document, DomError, ElementBuilder, Event, Node, Props};
    pub use hashkit_router::{Link, Router, RouterBuilder, RouterError, Routes, init_router, link};
    pub use hashkit_state::{MemoryStorage, StateManager};
}

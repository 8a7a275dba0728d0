#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Core building blocks for `hashkit`.
//!
//! This crate hosts the document abstraction shared by every other `hashkit`
//! crate and the declarative [`ElementBuilder`]. A [`Document`] either binds
//! to the live browser DOM (on `wasm32` targets) or to an in-memory
//! [`VirtualDocument`] that behaves the same way for the operations used here,
//! which is what the test suites run against.

mod browser;
mod document;
mod element;
mod error;
pub mod event;
mod props;
mod virtual_dom;

pub use document::{Document, Node};
pub use element::{Arg, Child, ElementBuilder};
pub use error::DomError;
pub use event::{Event, EventHandler, handler};
pub use props::{PropValue, Property, Props};
pub use virtual_dom::{VirtualDocument, VirtualNode};

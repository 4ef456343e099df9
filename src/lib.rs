//! # Strand
//! Strand is a fine-grained reactive templating engine. Templates compile once
//! into step lists; rendering a step list against an observable view model
//! builds a node tree and binds every expression in it to the exact model
//! fields it reads. A model write re-runs only those bindings, synchronously,
//! without diffing anything.
//!
//! ## Example: a todo list
//! ```rust
//! use std::rc::Rc;
//! use serde_json::json;
//! use strand::prelude::*;
//!
//! let document = Rc::new(MemoryDocument::new());
//! let engine = Engine::new(document.clone()).unwrap();
//!
//! let vm = Model::from_json(json!({
//!     "list": [{ "item": "x", "done": false }, { "item": "y", "done": true }],
//! }));
//! let todos = engine
//!     .component(r#"<ul u-for="list as item, i"><li>{item}: {done}</li></ul>"#, vm.clone())
//!     .unwrap();
//!
//! assert_eq!(
//!     document.to_html(todos.root),
//!     "<ul><li>x: </li><li>y: true</li></ul>"
//! );
//!
//! let list = vm.get_untracked("list").unwrap();
//! list.as_list().unwrap().push(observe(json!({ "item": "z", "done": true })));
//! assert_eq!(document.text_content(todos.root), "x: y: truez: true");
//! ```
//!
//! ## Templates
//! Expressions are written between the configured delimiters (`{` and `}` by
//! default) in text and attribute values. Attributes starting with the
//! directive prefix (`u-` by default) are handled by the compiler:
//!
//! - `u-for="list as item, index"` renders the element's first child once per
//!   entry. Object entries also expose their fields as names. Looping over an
//!   object binds each field value and its key instead.
//! - `u-attr="{name}"` toggles a bare attribute.
//! - `u-bind="path"` binds a form control's value both ways.
//! - any other `u-NAME` is a dynamic attribute `NAME`.
//!
//! A dynamic `on*` attribute holding a single expression installs the
//! function it evaluates to as an event handler. An element whose tag names a
//! [`Component`] stored in the view model is replaced by that component;
//! [`Engine::placeholder`] stands in until the real one exists.
//!
//! ## State
//! The view model is a [`Model`](reactive::Model) built from plain data with
//! [`observe`](reactive::observe) or [`Model::from_json`](reactive::Model::from_json).
//! Reads made while a binding is being established subscribe it; writes
//! re-run the subscribers in the order they subscribed. Lists notify loops of
//! appends, removals and replacements so only the affected children are
//! rebuilt.

pub mod compile;
pub mod config;
pub mod document;
mod engine;
mod error;
pub mod expression;
pub mod markup;
pub mod render;
pub mod scope;

pub use compile::{Compiler, StepList};
pub use config::Config;
pub use document::{Document, MemoryDocument, NodeId};
pub use engine::{Component, Engine};
pub use error::{Error, Result};
pub use render::{RenderState, Renderer};
pub use scope::Scope;
pub use strand_reactive as reactive;

pub mod prelude {
    pub use crate::document::{Document, MemoryDocument, NodeId};
    pub use crate::{Component, Config, Engine};
    pub use strand_reactive::{observe, Callback, List, Model, Runtime, Value};
}

//! Testing utilities for Strand templates.
//!
//! This crate renders templates into a [`MemoryDocument`] so tests can
//! inspect the produced markup, fire events and tear components down without
//! any real document.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use strand_test::prelude::*;
//!
//! let harness = TestHarness::new(r#"<p class="{kind}">{count}</p>"#, json!({
//!     "kind": "note",
//!     "count": 1,
//! }));
//! assert_eq!(harness.html(), r#"<p class="note">1</p>"#);
//!
//! harness.vm().set("count", 2);
//! assert_eq!(harness.text(), "2");
//! ```

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use strand::{
    reactive::{Callback, List, Model, Runtime, Value},
    Component, Config, Document, Engine, MemoryDocument, NodeId,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prelude module for convenient imports in tests.
pub mod prelude {
    pub use super::{init_tracing, CallTracker, TestHarness};
    pub use strand::prelude::*;
    pub use strand::reactive::ListObserver;
    pub use strand::Renderer;
}

/// Install a test-writer subscriber filtered by `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().without_time())
        .try_init()
        .ok();
}

/// One component rendered into its own in-memory document.
pub struct TestHarness {
    engine: Engine,
    document: Rc<MemoryDocument>,
    component: Component,
}

impl TestHarness {
    /// Render `markup` against a model built from `data`.
    ///
    /// # Panics
    ///
    /// If the template does not compile.
    pub fn new(markup: &str, data: serde_json::Value) -> Self {
        Self::with_model(markup, Model::from_json(data))
    }

    pub fn with_model(markup: &str, vm: Model) -> Self {
        Self::with_config(markup, vm, Config::default())
    }

    pub fn with_config(markup: &str, vm: Model, config: Config) -> Self {
        init_tracing();
        let document = Rc::new(MemoryDocument::new());
        let engine = Engine::with_config(document.clone(), config).expect("valid config");
        let component = engine
            .component(markup, vm)
            .unwrap_or_else(|err| panic!("template failed to compile: {err}"));
        Self {
            engine,
            document,
            component,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    pub fn runtime(&self) -> &Runtime {
        self.engine.runtime()
    }

    pub fn vm(&self) -> &Model {
        &self.component.vm
    }

    pub fn root(&self) -> NodeId {
        self.component.root
    }

    /// The list stored under `key` in the view model.
    ///
    /// # Panics
    ///
    /// If `key` does not hold a list.
    pub fn list(&self, key: &str) -> List {
        match self.vm().get_untracked(key) {
            Some(Value::List(list)) => list,
            other => panic!("`{key}` is not a list: {other:?}"),
        }
    }

    pub fn html(&self) -> String {
        self.document.to_html(self.root())
    }

    pub fn text(&self) -> String {
        self.document.text_content(self.root())
    }

    /// Follow element children by position from the root.
    ///
    /// # Panics
    ///
    /// If a position is out of range.
    pub fn child(&self, path: &[usize]) -> NodeId {
        path.iter().fold(self.root(), |node, &index| {
            let children = self.document.element_children(node);
            *children
                .get(index)
                .unwrap_or_else(|| panic!("no child {index} in {path:?}"))
        })
    }

    /// The text of each element child of `node`.
    pub fn child_texts(&self, node: NodeId) -> Vec<String> {
        self.document
            .element_children(node)
            .into_iter()
            .map(|child| self.document.text_content(child))
            .collect()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.document.attribute(node, name)
    }

    pub fn click(&self, node: NodeId) -> bool {
        self.document.dispatch(node, "click")
    }

    /// Set a control's value and fire `input` on it, as typing would.
    pub fn input(&self, node: NodeId, value: &str) -> bool {
        self.document.set_value(node, value);
        self.document.dispatch(node, "input")
    }

    /// Unbind the whole component, leaving its nodes in place. Returns the
    /// number of bindings torn down.
    pub fn unbind(&self) -> usize {
        self.engine.renderer().unbind(self.root())
    }

    pub fn node_count(&self) -> usize {
        self.document.node_count()
    }

    pub fn live_bindings(&self) -> usize {
        self.runtime().live_bindings()
    }
}

/// Records calls of a [`Callback`] placed in a view model.
#[derive(Clone, Default)]
pub struct CallTracker {
    count: Rc<Cell<usize>>,
    calls: Rc<RefCell<Vec<Vec<Value>>>>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback recording its arguments and returning `null`.
    pub fn callback(&self) -> Callback {
        let count = self.count.clone();
        let calls = self.calls.clone();
        Callback::new(move |args| {
            count.set(count.get() + 1);
            calls.borrow_mut().push(args.to_vec());
            Value::Null
        })
    }

    pub fn was_called(&self) -> bool {
        self.count.get() > 0
    }

    pub fn call_count(&self) -> usize {
        self.count.get()
    }

    /// The arguments of every call, in order.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.borrow().clone()
    }

    pub fn reset(&self) {
        self.count.set(0);
        self.calls.borrow_mut().clear();
    }
}

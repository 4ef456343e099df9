//! # strand_reactive
//!
//! The observable data model behind strand templates.
//!
//! Plain data is wrapped once ([`observe`], [`Model::from_json`]) into a graph of
//! [`Model`] objects and [`List`]s. A [`Binding`] is a closure run once with the
//! [`Runtime`]'s active slot pointing at it; every field it reads during that
//! run subscribes it. Writing the field re-runs it, synchronously and in
//! registration order, before the write returns.
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use strand_reactive::{Binding, Model, Runtime};
//!
//! let runtime = Runtime::new();
//! let vm = Model::from_json(serde_json::json!({ "name": "Ada" }));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let _binding = Binding::new(&runtime, {
//!     let (runtime, vm, seen) = (runtime.clone(), vm.clone(), seen.clone());
//!     move || seen.borrow_mut().push(vm.get(&runtime, "name").unwrap().to_string())
//! });
//!
//! vm.set("name", "Grace");
//! assert_eq!(*seen.borrow(), ["Ada", "Grace"]);
//! ```

mod binding;
mod id;
mod list;
mod model;
mod parent;
mod runtime;
mod subscribers;
mod value;

pub use binding::Binding;
pub use id::Id;
pub use list::{List, ListObserver};
pub use model::Model;
pub use runtime::Runtime;
pub use subscribers::Subscribers;
pub use value::{observe, Callback, Opaque, Value};

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::binding::Binding;

/// The dependency registry of one render tree.
///
/// It holds the "currently evaluating" binding: any observable read performed
/// while a binding is active subscribes that binding to the value it read.
/// Reads with no active binding are inert.
///
/// A `Runtime` is a cheap handle; clones share the same slot. It is passed
/// explicitly to every evaluation instead of living in a global, and every
/// activation saves the previous occupant of the slot and restores it after,
/// so bindings created while another binding is being established (a loop
/// body rendering its items, nested dynamic attributes) attribute their reads
/// correctly.
#[derive(Clone, Default)]
pub struct Runtime {
    state: Rc<RuntimeState>,
}

#[derive(Default)]
struct RuntimeState {
    current_binding: RefCell<Option<Rc<Binding>>>,
    live_bindings: Cell<usize>,
    created_bindings: Cell<usize>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Runtime");
        s.field("live_bindings", &self.live_bindings());
        s.field("created_bindings", &self.created_bindings());
        s.finish()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// The binding that reads are currently attributed to, if any.
    pub fn current_binding(&self) -> Option<Rc<Binding>> {
        self.state.current_binding.borrow().clone()
    }

    /// Runs `f` with `binding` occupying the active slot, restoring whatever
    /// occupied it before once `f` returns.
    pub fn with_binding<T>(&self, binding: Option<Rc<Binding>>, f: impl FnOnce() -> T) -> T {
        let prev = self.state.current_binding.replace(binding);
        let result = f();
        *self.state.current_binding.borrow_mut() = prev;
        result
    }

    /// Reads performed inside `f` are not attributed to any binding.
    pub fn untrack<T>(&self, f: impl FnOnce() -> T) -> T {
        self.with_binding(None, f)
    }

    /// Number of bindings created on this runtime that have not been disposed.
    pub fn live_bindings(&self) -> usize {
        self.state.live_bindings.get()
    }

    /// Number of bindings ever created on this runtime.
    pub fn created_bindings(&self) -> usize {
        self.state.created_bindings.get()
    }

    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn binding_created(&self) {
        self.state.live_bindings.set(self.state.live_bindings.get() + 1);
        self.state
            .created_bindings
            .set(self.state.created_bindings.get() + 1);
    }

    pub(crate) fn binding_disposed(&self) {
        self.state
            .live_bindings
            .set(self.state.live_bindings.get().saturating_sub(1));
    }
}

use std::{cell::RefCell, fmt, hash::BuildHasherDefault, rc::Rc};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::{binding::Binding, id::Id, runtime::Runtime};

pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

pub(crate) type SubscriberMap = FxIndexMap<Id, Rc<Binding>>;

/// The ordered set of bindings depending on one observable slot.
///
/// Bindings are kept in registration order and appear at most once.
#[derive(Clone, Default)]
pub struct Subscribers(Rc<RefCell<SubscriberMap>>);

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().keys()).finish()
    }
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the runtime's active binding, if there is one.
    pub fn track(&self, runtime: &Runtime) {
        let Some(binding) = runtime.current_binding() else {
            return;
        };
        let inserted = self
            .0
            .borrow_mut()
            .insert(binding.id(), binding.clone())
            .is_none();
        if inserted {
            binding.add_observer(Rc::downgrade(&self.0));
        }
    }

    /// Re-run every subscribed binding in registration order.
    pub fn notify(&self) {
        for binding in self.snapshot() {
            binding.run();
        }
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn contains(&self, binding: &Binding) -> bool {
        self.0.borrow().contains_key(&binding.id())
    }

    // The map must not stay borrowed while bindings run: they subscribe and
    // dispose.
    fn snapshot(&self) -> SmallVec<[Rc<Binding>; 8]> {
        self.0.borrow().values().cloned().collect()
    }
}

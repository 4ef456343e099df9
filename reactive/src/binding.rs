use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{id::Id, runtime::Runtime, subscribers::SubscriberMap};

/// A reactive closure linking the observable values it reads to one mutation.
///
/// The first run happens inside [`Binding::new`] with the binding occupying the
/// runtime's active slot, so every observable read subscribes it. After that
/// the binding is "bound": later runs are plain re-applications that never
/// register again, even if some other binding is being established at the
/// time.
pub struct Binding {
    id: Id,
    runtime: Runtime,
    f: Box<dyn Fn()>,
    bound: Cell<bool>,
    running: Cell<bool>,
    disposed: Cell<bool>,
    observers: RefCell<SmallVec<[Weak<RefCell<SubscriberMap>>; 4]>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Binding");
        s.field("id", &self.id);
        s.field("bound", &self.bound.get());
        s.field("disposed", &self.disposed.get());
        s.field("observers", &self.observers.borrow().len());
        s.finish()
    }
}

impl Binding {
    /// Create a binding and run it once, subscribing it to everything it reads.
    pub fn new(runtime: &Runtime, f: impl Fn() + 'static) -> Rc<Binding> {
        let binding = Rc::new(Binding {
            id: Id::next(),
            runtime: runtime.clone(),
            f: Box::new(f),
            bound: Cell::new(false),
            running: Cell::new(false),
            disposed: Cell::new(false),
            observers: RefCell::new(SmallVec::new()),
        });
        runtime.binding_created();
        binding.run();
        binding
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Number of subscriber lists this binding is registered in.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Run the binding. A binding that writes one of its own dependencies is
    /// not re-entered.
    pub fn run(self: &Rc<Self>) {
        if self.disposed.get() || self.running.get() {
            return;
        }
        self.running.set(true);
        if self.bound.replace(true) {
            tracing::trace!(binding = ?self.id, "re-applying binding");
            self.runtime.untrack(|| (self.f)());
        } else {
            self.runtime.with_binding(Some(self.clone()), || (self.f)());
        }
        self.running.set(false);
    }

    /// Unsubscribe from every value this binding observed. Returns `false` if
    /// it was already disposed.
    pub fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        for observer in self.observers.take() {
            if let Some(subscribers) = observer.upgrade() {
                subscribers.borrow_mut().shift_remove(&self.id);
            }
        }
        self.runtime.binding_disposed();
        true
    }

    pub(crate) fn add_observer(&self, subscribers: Weak<RefCell<SubscriberMap>>) {
        self.observers.borrow_mut().push(subscribers);
    }
}

use std::{cell::RefCell, fmt, rc::Rc};

use smallvec::SmallVec;

use crate::{
    id::Id,
    parent::{self, ParentLink, Parents},
    runtime::Runtime,
    subscribers::Subscribers,
    value::Value,
};

/// Receives the structural changes of a [`List`].
///
/// Every mutation of a list is expressed as a sequence of these three calls,
/// issued to each registered observer in registration order.
pub trait ListObserver {
    fn append(&self, item: &Value, index: usize);
    fn remove(&self, index: usize);
    fn replace(&self, item: &Value, index: usize);
}

/// An observable list.
///
/// Besides ordinary subscribers (bindings that read its length or items), a
/// list carries the observers of every loop currently rendering it. The same
/// list may back any number of loops at once.
#[derive(Clone)]
pub struct List(pub(crate) Rc<ListInner>);

pub(crate) struct ListInner {
    id: Id,
    items: RefCell<Vec<Value>>,
    subscribers: Subscribers,
    observers: RefCell<SmallVec<[(Id, Rc<dyn ListObserver>); 2]>>,
    pub(crate) parents: Parents,
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("List");
        s.field("id", &self.0.id);
        s.field("len", &self.len_untracked());
        s.field("observers", &self.observer_count());
        s.finish()
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl List {
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        let list = Self(Rc::new(ListInner {
            id: Id::next(),
            items: RefCell::new(Vec::new()),
            subscribers: Subscribers::new(),
            observers: RefCell::new(SmallVec::new()),
            parents: Parents::default(),
        }));
        {
            let mut slots = list.0.items.borrow_mut();
            for item in items {
                parent::link(&item, list.item_link());
                slots.push(item);
            }
        }
        list
    }

    pub fn id(&self) -> Id {
        self.0.id
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn len(&self, runtime: &Runtime) -> usize {
        self.0.subscribers.track(runtime);
        self.len_untracked()
    }

    pub fn is_empty(&self, runtime: &Runtime) -> bool {
        self.len(runtime) == 0
    }

    pub fn get(&self, runtime: &Runtime, index: usize) -> Option<Value> {
        self.0.subscribers.track(runtime);
        self.get_untracked(index)
    }

    pub fn to_vec(&self, runtime: &Runtime) -> Vec<Value> {
        self.0.subscribers.track(runtime);
        self.to_vec_untracked()
    }

    pub fn len_untracked(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn get_untracked(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    pub fn to_vec_untracked(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    /// Number of bindings reading this list directly.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.len()
    }

    /// Register a loop observer. The returned id unregisters it.
    pub fn observe(&self, observer: Rc<dyn ListObserver>) -> Id {
        let id = Id::next();
        self.0.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn unobserve(&self, id: Id) -> bool {
        let mut observers = self.0.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer, _)| *observer != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.0.observers.borrow().len()
    }

    pub fn push(&self, item: impl Into<Value>) {
        let item = item.into();
        let index = {
            let mut items = self.0.items.borrow_mut();
            items.push(item.clone());
            items.len() - 1
        };
        parent::link(&item, self.item_link());
        tracing::trace!(list = ?self.0.id, index, "list push");
        for observer in self.observers() {
            observer.append(&item, index);
        }
        self.changed();
    }

    pub fn pop(&self) -> Option<Value> {
        let len = self.len_untracked();
        if len == 0 {
            return None;
        }
        self.remove(len - 1)
    }

    /// Insert at `index`, clamped to the list length. Observers see every
    /// shifted entry replaced in place and the last one appended.
    pub fn insert(&self, index: usize, item: impl Into<Value>) {
        let item = item.into();
        let (index, shifted) = {
            let mut items = self.0.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, item.clone());
            (index, items[index..].to_vec())
        };
        parent::link(&item, self.item_link());
        tracing::trace!(list = ?self.0.id, index, "list insert");
        let last = index + shifted.len() - 1;
        for observer in self.observers() {
            for (offset, entry) in shifted.iter().enumerate() {
                let at = index + offset;
                if at == last {
                    observer.append(entry, at);
                } else {
                    observer.replace(entry, at);
                }
            }
        }
        self.changed();
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut items = self.0.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        parent::unlink(&removed, self.0.id, None);
        tracing::trace!(list = ?self.0.id, index, "list remove");
        for observer in self.observers() {
            observer.remove(index);
        }
        self.changed();
        Some(removed)
    }

    /// Replace the entry at `index`. Writing at `len` appends; anything past
    /// that is ignored.
    pub fn set(&self, index: usize, item: impl Into<Value>) -> Option<Value> {
        let item = item.into();
        let old = {
            let mut items = self.0.items.borrow_mut();
            match index.cmp(&items.len()) {
                std::cmp::Ordering::Less => {
                    if items[index] == item && !item.is_container() {
                        return None;
                    }
                    std::mem::replace(&mut items[index], item.clone())
                }
                std::cmp::Ordering::Equal => {
                    drop(items);
                    self.push(item);
                    return None;
                }
                std::cmp::Ordering::Greater => return None,
            }
        };
        parent::unlink(&old, self.0.id, None);
        parent::link(&item, self.item_link());
        tracing::trace!(list = ?self.0.id, index, "list set");
        for observer in self.observers() {
            observer.replace(&item, index);
        }
        self.changed();
        Some(old)
    }

    pub fn swap(&self, a: usize, b: usize) {
        let (first, second) = {
            let mut items = self.0.items.borrow_mut();
            if a >= items.len() || b >= items.len() || a == b {
                return;
            }
            items.swap(a, b);
            (items[a].clone(), items[b].clone())
        };
        for observer in self.observers() {
            observer.replace(&first, a);
            observer.replace(&second, b);
        }
        self.changed();
    }

    /// Remove every entry, last first.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.0.items.borrow_mut());
        if removed.is_empty() {
            return;
        }
        for item in &removed {
            parent::unlink(item, self.0.id, None);
        }
        for observer in self.observers() {
            for index in (0..removed.len()).rev() {
                observer.remove(index);
            }
        }
        self.changed();
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.0
                .items
                .borrow()
                .iter()
                .map(Value::to_json)
                .collect(),
        )
    }

    pub(crate) fn child_modified(&self) {
        self.changed();
    }

    fn changed(&self) {
        self.0.subscribers.notify();
        self.0.parents.notify();
    }

    fn observers(&self) -> SmallVec<[Rc<dyn ListObserver>; 2]> {
        self.0
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect()
    }

    fn item_link(&self) -> ParentLink {
        ParentLink::Item {
            parent: self.0.id,
            list: Rc::downgrade(&self.0),
        }
    }
}

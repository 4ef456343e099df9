use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    id::Id,
    parent::{self, ParentLink, Parents},
    runtime::Runtime,
    subscribers::{FxIndexMap, Subscribers},
    value::Value,
};

/// One level of an observable object.
///
/// Every field is a slot holding a value and the bindings that read it.
/// Reading a field through [`Model::get`] while a binding is active subscribes
/// that binding; writing with [`Model::set`] stores the value and re-runs the
/// subscribers in registration order, then re-runs the dependents of every
/// slot this object is nested in.
#[derive(Clone)]
pub struct Model(pub(crate) Rc<ModelInner>);

pub(crate) struct ModelInner {
    id: Id,
    fields: RefCell<FxIndexMap<Rc<str>, Slot>>,
    pub(crate) parents: Parents,
}

struct Slot {
    value: Value,
    subscribers: Subscribers,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Model");
        s.field("id", &self.0.id);
        s.field("keys", &self.keys());
        s.finish()
    }
}

impl Model {
    pub fn new() -> Self {
        Self(Rc::new(ModelInner {
            id: Id::next(),
            fields: RefCell::new(FxIndexMap::default()),
            parents: Parents::default(),
        }))
    }

    pub fn from_fields<K: Into<Rc<str>>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        let model = Self::new();
        {
            let mut slots = model.0.fields.borrow_mut();
            for (key, value) in fields {
                let key = key.into();
                parent::link(&value, model.field_link(key.clone()));
                slots.insert(
                    key,
                    Slot {
                        value,
                        subscribers: Subscribers::new(),
                    },
                );
            }
        }
        model
    }

    /// Wrap a plain JSON object. Any other root yields an empty model.
    pub fn from_json(data: serde_json::Value) -> Self {
        match Value::from_json(data) {
            Value::Object(model) => model,
            other => {
                tracing::warn!(root = %other, "model root is not an object");
                Self::new()
            }
        }
    }

    pub fn id(&self) -> Id {
        self.0.id
    }

    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Read a field, subscribing the runtime's active binding to it.
    pub fn get(&self, runtime: &Runtime, key: &str) -> Option<Value> {
        let fields = self.0.fields.borrow();
        let slot = fields.get(key)?;
        slot.subscribers.track(runtime);
        Some(slot.value.clone())
    }

    pub fn get_untracked(&self, key: &str) -> Option<Value> {
        self.0
            .fields
            .borrow()
            .get(key)
            .map(|slot| slot.value.clone())
    }

    /// Store `value` under `key` and re-run its dependents.
    ///
    /// Writing a primitive equal to the stored one is a no-op. Objects and
    /// lists always notify.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let (subscribers, old) = {
            let mut fields = self.0.fields.borrow_mut();
            match fields.get_mut(key) {
                Some(slot) => {
                    if slot.value == value && !value.is_container() {
                        return;
                    }
                    let old = std::mem::replace(&mut slot.value, value.clone());
                    (slot.subscribers.clone(), Some(old))
                }
                None => {
                    fields.insert(
                        key.into(),
                        Slot {
                            value: value.clone(),
                            subscribers: Subscribers::new(),
                        },
                    );
                    (Subscribers::new(), None)
                }
            }
        };
        if let Some(old) = &old {
            parent::unlink(old, self.0.id, Some(key));
        }
        parent::link(&value, self.field_link(key.into()));

        tracing::trace!(model = ?self.0.id, key, subscribers = subscribers.len(), "model write");
        subscribers.notify();
        self.0.parents.notify();
    }

    /// Re-run the dependents of `key` without changing its value.
    pub fn touch(&self, key: &str) {
        self.child_modified(key);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.fields.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.fields.borrow().is_empty()
    }

    /// Number of bindings currently depending on `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.0
            .fields
            .borrow()
            .get(key)
            .map_or(0, |slot| slot.subscribers.len())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .fields
                .borrow()
                .iter()
                .map(|(key, slot)| (key.to_string(), slot.value.to_json()))
                .collect(),
        )
    }

    /// A nested value under `key` changed: notify without storing anything.
    pub(crate) fn child_modified(&self, key: &str) {
        let subscribers = self
            .0
            .fields
            .borrow()
            .get(key)
            .map(|slot| slot.subscribers.clone());
        if let Some(subscribers) = subscribers {
            subscribers.notify();
        }
        self.0.parents.notify();
    }

    fn field_link(&self, key: Rc<str>) -> ParentLink {
        ParentLink::Field {
            parent: self.0.id,
            model: Rc::downgrade(&self.0),
            key,
        }
    }
}

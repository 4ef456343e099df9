use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{
    id::Id,
    list::{List, ListInner},
    model::{Model, ModelInner},
    value::Value,
};

/// Where a nested object or list is stored.
pub(crate) enum ParentLink {
    Field {
        parent: Id,
        model: Weak<ModelInner>,
        key: Rc<str>,
    },
    Item {
        parent: Id,
        list: Weak<ListInner>,
    },
}

impl ParentLink {
    fn matches(&self, id: Id, field: Option<&str>) -> bool {
        match self {
            ParentLink::Field { parent, key, .. } => *parent == id && field == Some(&**key),
            ParentLink::Item { parent, .. } => *parent == id && field.is_none(),
        }
    }
}

enum Target {
    Field(Model, Rc<str>),
    Item(List),
}

/// Back links from a nested node to the slots holding it, used to propagate
/// "child modified" notifications upward.
#[derive(Default)]
pub(crate) struct Parents {
    links: RefCell<SmallVec<[ParentLink; 1]>>,
    notifying: Cell<bool>,
}

impl Parents {
    /// Re-run the dependents of every slot holding this node, without storing
    /// anything in them. Cyclic data stops at the first node seen twice.
    pub(crate) fn notify(&self) {
        if self.notifying.replace(true) {
            return;
        }
        let targets: SmallVec<[Target; 1]> = self
            .links
            .borrow()
            .iter()
            .filter_map(|link| match link {
                ParentLink::Field { model, key, .. } => model
                    .upgrade()
                    .map(|model| Target::Field(Model(model), key.clone())),
                ParentLink::Item { list, .. } => list.upgrade().map(|list| Target::Item(List(list))),
            })
            .collect();
        for target in targets {
            match target {
                Target::Field(model, key) => model.child_modified(&key),
                Target::Item(list) => list.child_modified(),
            }
        }
        self.notifying.set(false);
    }

    fn link(&self, link: ParentLink) {
        self.links.borrow_mut().push(link);
    }

    fn unlink(&self, parent: Id, field: Option<&str>) {
        let mut links = self.links.borrow_mut();
        links.retain(|link| {
            let dead = match link {
                ParentLink::Field { model, .. } => model.strong_count() == 0,
                ParentLink::Item { list, .. } => list.strong_count() == 0,
            };
            !dead
        });
        if let Some(pos) = links.iter().position(|link| link.matches(parent, field)) {
            links.remove(pos);
        }
    }
}

fn parents_of(value: &Value) -> Option<&Parents> {
    match value {
        Value::Object(model) => Some(&model.0.parents),
        Value::List(list) => Some(&list.0.parents),
        _ => None,
    }
}

pub(crate) fn link(value: &Value, link: ParentLink) {
    if let Some(parents) = parents_of(value) {
        parents.link(link);
    }
}

pub(crate) fn unlink(value: &Value, parent: Id, field: Option<&str>) {
    if let Some(parents) = parents_of(value) {
        parents.unlink(parent, field);
    }
}

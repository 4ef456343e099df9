use std::{fmt, rc::Rc};

use rustc_hash::FxHashMap;
use strand_reactive::{Model, Runtime, Value};

/// One layer of names visible to template expressions.
pub enum Layer {
    /// Loop variables and other names bound by the renderer. Read-only.
    Vars(FxHashMap<Rc<str>, Value>),
    /// The fields of an object, read through the model so they are tracked.
    Fields(Model),
}

/// A chain of name layers. Lookups walk from the innermost layer outwards,
/// so inner names shadow outer ones only inside the scope that binds them.
pub struct Scope {
    layer: Layer,
    parent: Option<Rc<Scope>>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut scope = Some(self);
        while let Some(current) = scope {
            match &current.layer {
                Layer::Vars(vars) => list.entry(&vars.keys().collect::<Vec<_>>()),
                Layer::Fields(model) => list.entry(&model.id()),
            };
            scope = current.parent.as_deref();
        }
        list.finish()
    }
}

impl Scope {
    /// An empty scope with no parent.
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope {
            layer: Layer::Vars(FxHashMap::default()),
            parent: None,
        })
    }

    /// A variable layer over `self`.
    pub fn child<K: Into<Rc<str>>>(
        self: &Rc<Self>,
        vars: impl IntoIterator<Item = (K, Value)>,
    ) -> Rc<Scope> {
        Rc::new(Scope {
            layer: Layer::Vars(
                vars.into_iter()
                    .map(|(name, value)| (name.into(), value))
                    .collect(),
            ),
            parent: Some(self.clone()),
        })
    }

    /// A layer exposing the fields of `model` as names, over `self`.
    pub fn with_fields(self: &Rc<Self>, model: Model) -> Rc<Scope> {
        Rc::new(Scope {
            layer: Layer::Fields(model),
            parent: Some(self.clone()),
        })
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Resolve `name`. Field layers subscribe the active binding to the field.
    pub fn lookup(&self, runtime: &Runtime, name: &str) -> Option<Value> {
        self.layers().find_map(|layer| match layer {
            Layer::Vars(vars) => vars.get(name).cloned(),
            Layer::Fields(model) => model.get(runtime, name),
        })
    }

    /// Whether any layer binds `name`.
    pub fn defines(&self, name: &str) -> bool {
        self.layers().any(|layer| layer.defines(name))
    }

    /// The object whose field `name` resolves to, if the innermost layer
    /// binding `name` is a field layer.
    pub fn owner(&self, name: &str) -> Option<Model> {
        match self.layers().find(|layer| layer.defines(name))? {
            Layer::Fields(model) => Some(model.clone()),
            Layer::Vars(_) => None,
        }
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref()).map(|scope| &scope.layer)
    }
}

impl Layer {
    fn defines(&self, name: &str) -> bool {
        match self {
            Layer::Vars(vars) => vars.contains_key(name),
            Layer::Fields(model) => model.contains_key(name),
        }
    }
}

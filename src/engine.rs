use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use rustc_hash::FxHashMap;
use strand_reactive::{Model, Opaque, Runtime, Value};

use crate::{
    compile::{Compiler, StepList},
    config::Config,
    document::{Document, NodeId},
    error::Result,
    render::Renderer,
    scope::Scope,
};

/// A rendered template and the view model it is bound to.
#[derive(Debug)]
pub struct Component {
    pub root: NodeId,
    pub vm: Model,
    parent: Cell<Option<NodeId>>,
}

impl Component {
    /// The node this component is mounted under, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent.get()
    }
}

/// Stores the component in a model. An element whose tag names the field is
/// replaced by the component's root when rendered.
impl From<Component> for Value {
    fn from(component: Component) -> Self {
        Value::Opaque(Opaque::new(component))
    }
}

/// Compiles templates and renders them into one document.
///
/// Templates compiled through [`Engine::compile`] are cached by their source,
/// so every component made from the same markup replays the same step list.
/// The cache lives as long as the engine; callers that feed it an unbounded
/// set of distinct templates should call [`Engine::clear_cache`].
pub struct Engine {
    compiler: Compiler,
    renderer: Renderer,
    /// Keyed by the full template source. Never evicted on its own.
    cache: RefCell<FxHashMap<Rc<str>, Rc<StepList>>>,
}

impl Engine {
    pub fn new(document: Rc<dyn Document>) -> Result<Self> {
        Self::with_config(document, Config::default())
    }

    pub fn with_config(document: Rc<dyn Document>, config: Config) -> Result<Self> {
        Ok(Self {
            compiler: Compiler::new(config)?,
            renderer: Renderer::new(document),
            cache: RefCell::new(FxHashMap::default()),
        })
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn runtime(&self) -> &Runtime {
        self.renderer.runtime()
    }

    pub fn document(&self) -> &dyn Document {
        self.renderer.document()
    }

    pub fn compile(&self, markup: &str) -> Result<Rc<StepList>> {
        if let Some(steps) = self.cache.borrow().get(markup) {
            return Ok(steps.clone());
        }
        let steps = self.compiler.compile_str(markup)?;
        self.cache.borrow_mut().insert(markup.into(), steps.clone());
        Ok(steps)
    }

    /// Forget every compiled template. Components already rendered keep
    /// their step lists.
    pub fn clear_cache(&self) -> usize {
        let mut cache = self.cache.borrow_mut();
        let count = cache.len();
        cache.clear();
        tracing::debug!(templates = count, "template cache cleared");
        count
    }

    pub fn cached_templates(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn render(&self, steps: &StepList, vm: &Model) -> NodeId {
        self.renderer.render(steps, vm, &Scope::root())
    }

    pub fn component(&self, markup: &str, vm: Model) -> Result<Component> {
        let steps = self.compile(markup)?;
        let root = self.render(&steps, &vm);
        tracing::debug!(tag = steps.tag(), ?root, "component rendered");
        Ok(Component {
            root,
            vm,
            parent: Cell::new(None),
        })
    }

    /// A stand-in component whose root is an empty `tag` element (`div` by
    /// default), for binding a child component slot before the real one
    /// exists.
    pub fn placeholder(&self, tag: Option<&str>) -> Component {
        let root = self.document().create_element(tag.unwrap_or("div"));
        Component {
            root,
            vm: Model::new(),
            parent: Cell::new(None),
        }
    }

    pub fn mount(&self, component: &Component, parent: NodeId) {
        self.document().append_child(parent, component.root);
        component.parent.set(Some(parent));
    }

    /// Unbind the component, detach it from where it was mounted and release
    /// its nodes. Returns the number of bindings torn down.
    pub fn unmount(&self, component: &Component) -> usize {
        let count = self.renderer.unbind(component.root);
        if let Some(parent) = component.parent.take() {
            self.document().remove_child(parent, component.root);
        }
        self.document().drop_node(component.root);
        tracing::debug!(root = ?component.root, bindings = count, "component unmounted");
        count
    }
}

//! The binding runtime: replays step lists into a [`Document`] and keeps the
//! per-node teardown ledger.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use slotmap::SecondaryMap;
use smallvec::SmallVec;
use strand_reactive::{Binding, Model, Runtime};

use crate::{
    compile::StepList,
    document::{Document, NodeId},
    expression::Env,
    scope::Scope,
};

type Teardown = Box<dyn FnOnce()>;

/// The state threaded through a step list: the view model, the loop scope and
/// the node under construction.
#[derive(Clone, educe::Educe)]
#[educe(Debug)]
pub struct RenderState {
    #[educe(Debug(ignore))]
    pub renderer: Renderer,
    pub vm: Model,
    pub ctx: Rc<Scope>,
    pub el: NodeId,
}

impl RenderState {
    pub fn env(&self) -> Env<'_> {
        Env {
            runtime: self.renderer.runtime(),
            vm: &self.vm,
            scope: &self.ctx,
        }
    }

    pub fn document(&self) -> &dyn Document {
        self.renderer.document()
    }
}

/// Renders step lists and tears their bindings down again.
///
/// Every node created by [`Renderer::render`] gets a ledger of teardown
/// callbacks. Each binding created while rendering pushes exactly one entry
/// onto the ledger of the element it was created for, so unbinding a subtree
/// runs one callback per binding in it.
#[derive(Clone)]
pub struct Renderer(Rc<RendererInner>);

struct RendererInner {
    runtime: Runtime,
    document: Rc<dyn Document>,
    ledger: RefCell<SecondaryMap<NodeId, SmallVec<[Teardown; 4]>>>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("runtime", &self.0.runtime)
            .field("bound_nodes", &self.0.ledger.borrow().len())
            .finish()
    }
}

impl Renderer {
    pub fn new(document: Rc<dyn Document>) -> Self {
        Self::with_runtime(Runtime::new(), document)
    }

    pub fn with_runtime(runtime: Runtime, document: Rc<dyn Document>) -> Self {
        Self(Rc::new(RendererInner {
            runtime,
            document,
            ledger: RefCell::new(SecondaryMap::new()),
        }))
    }

    pub fn runtime(&self) -> &Runtime {
        &self.0.runtime
    }

    pub fn document(&self) -> &dyn Document {
        &*self.0.document
    }

    pub(crate) fn downgrade_document(&self) -> Weak<dyn Document> {
        Rc::downgrade(&self.0.document)
    }

    /// Build the root node of `steps` and run every step against it in order.
    pub fn render(&self, steps: &StepList, vm: &Model, ctx: &Rc<Scope>) -> NodeId {
        let el = self.document().create_element(steps.tag());
        self.0.ledger.borrow_mut().insert(el, SmallVec::new());
        let state = RenderState {
            renderer: self.clone(),
            vm: vm.clone(),
            ctx: ctx.clone(),
            el,
        };
        steps.steps().iter().fold(state, |state, step| step(state)).el
    }

    /// Establish a binding for `state.el`: `mutate` runs now with reads
    /// attributed to the new binding, and again whenever one of them changes.
    pub fn bind_step(
        &self,
        state: &RenderState,
        mutate: impl Fn(&RenderState) + 'static,
    ) -> Rc<Binding> {
        self.bind_step_with(state, mutate, || {})
    }

    /// Like [`Renderer::bind_step`], with extra clean-up run in the same ledger
    /// entry that disposes the binding.
    pub fn bind_step_with(
        &self,
        state: &RenderState,
        mutate: impl Fn(&RenderState) + 'static,
        clean_up: impl FnOnce() + 'static,
    ) -> Rc<Binding> {
        let captured = state.clone();
        let binding = Binding::new(self.runtime(), move || mutate(&captured));
        let disposed = binding.clone();
        self.on_unbind(state.el, move || {
            disposed.dispose();
            clean_up();
        });
        binding
    }

    /// Register a teardown callback on `node`. Ignored for nodes this renderer
    /// did not build or has already unbound.
    pub fn on_unbind(&self, node: NodeId, teardown: impl FnOnce() + 'static) {
        let mut ledger = self.0.ledger.borrow_mut();
        match ledger.get_mut(node) {
            Some(entries) => entries.push(Box::new(teardown)),
            None => tracing::debug!(?node, "teardown registered on an unbound node"),
        }
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.0.ledger.borrow().contains_key(node)
    }

    /// Tear down every binding in the subtree at `node`, children first.
    /// Returns the number of teardown callbacks run.
    pub fn unbind(&self, node: NodeId) -> usize {
        let mut count = 0;
        for child in self.document().children(node) {
            count += self.unbind(child);
        }
        let teardowns = self.0.ledger.borrow_mut().remove(node);
        for teardown in teardowns.into_iter().flatten() {
            teardown();
            count += 1;
        }
        count
    }
}

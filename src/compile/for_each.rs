//! `u-for="source as item[, index]"`: one rendered child per entry.
//!
//! A list source is kept in step through append/remove/replace notifications.
//! An object source renders one child per field, with the key bound to the
//! second name, and is redrawn whenever the object changes.

use std::{cell::RefCell, rc::Rc};

use strand_reactive::{Id, List, ListObserver, Model, Value};

use super::{Compiler, Step, StepList};
use crate::{
    document::NodeId,
    error::{Error, Result},
    expression::Evaluator,
    markup::{Attribute, Element},
    render::{RenderState, Renderer},
    scope::Scope,
};

struct LoopNames {
    item: Rc<str>,
    index: Option<Rc<str>>,
}

pub(super) fn compile(
    compiler: &Compiler,
    attribute: &Attribute,
    element: &Element,
) -> Result<Step> {
    let malformed = || Error::MalformedLoop {
        directive: attribute.value.clone(),
    };
    let directive = compiler.strip_tags(&attribute.value);
    let (source, names) = directive.split_once(" as ").ok_or_else(malformed)?;

    let mut names = names.split(',').map(str::trim);
    let item = names.next().filter(|name| is_identifier(name)).ok_or_else(malformed)?;
    let index = match names.next() {
        Some(name) if is_identifier(name) => Some(name.into()),
        Some(_) => return Err(malformed()),
        None => None,
    };
    if names.next().is_some() {
        return Err(malformed());
    }

    let source = source.trim();
    let source = Rc::new(Evaluator::new(source).map_err(|error| Error::Expression {
        source_text: source.to_string(),
        error,
    })?);

    let mut bodies = element.element_children();
    let body = bodies.next().ok_or(Error::EmptyTemplate)?;
    let extra = bodies.count();
    if extra > 0 {
        tracing::warn!(
            tag = %element.tag,
            extra,
            "loop bodies must have only one root element, ignoring the rest"
        );
    }
    let body = compiler.compile(body)?;
    let names = Rc::new(LoopNames {
        item: item.into(),
        index,
    });

    Ok(Box::new(move |state| {
        bind(&state, source.clone(), body.clone(), names.clone());
        state
    }))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// What a loop instance is currently drawing from.
enum Source {
    /// Observed entry by entry.
    List(List, Id),
    /// Drawn once per run of the governing binding, which reruns whenever a
    /// field of the object changes.
    Object(Model),
}

/// One instantiation of a loop: renders children of `el` for the entries of
/// whatever list or object is currently the source.
struct ForEach {
    renderer: Renderer,
    el: NodeId,
    vm: Model,
    ctx: Rc<Scope>,
    body: Rc<StepList>,
    names: Rc<LoopNames>,
    source: RefCell<Option<Source>>,
}

/// The governing binding re-evaluates the source expression. The same list is
/// left alone; a different list, or any object, replaces every child.
fn bind(state: &RenderState, source: Rc<Evaluator>, body: Rc<StepList>, names: Rc<LoopNames>) {
    let for_each = Rc::new(ForEach {
        renderer: state.renderer.clone(),
        el: state.el,
        vm: state.vm.clone(),
        ctx: state.ctx.clone(),
        body,
        names,
        source: RefCell::new(None),
    });
    let observer = for_each.clone();
    state.renderer.bind_step_with(
        state,
        move |state| match source.evaluate(&state.env()) {
            Some(Value::List(list)) => observer.observe(list),
            Some(Value::Object(fields)) => observer.draw_object(fields),
            None | Some(Value::Null) => observer.observe(List::default()),
            Some(other) => {
                tracing::warn!(
                    source = source.source(),
                    value = %other,
                    "loop over a value that is neither a list nor an object"
                );
                observer.observe(List::default());
            }
        },
        move || {
            for_each.stop();
        },
    );
}

impl ForEach {
    fn observe(self: &Rc<Self>, list: List) {
        if let Some(Source::List(current, _)) = &*self.source.borrow() {
            if current.ptr_eq(&list) {
                return;
            }
        }
        if self.stop() {
            self.clear();
        }

        let id = list.observe(self.clone());
        *self.source.borrow_mut() = Some(Source::List(list.clone(), id));
        tracing::trace!(list = %list.id(), el = ?self.el, "loop observing list");

        self.renderer.runtime().untrack(|| {
            for (index, item) in list.to_vec_untracked().iter().enumerate() {
                self.append(item, index);
            }
        });
    }

    /// Render one child per field, in insertion order, with the field value
    /// as the item and the key as the index.
    fn draw_object(&self, fields: Model) {
        if self.stop() {
            self.clear();
        }
        tracing::trace!(object = %fields.id(), el = ?self.el, "loop drawing object");
        let document = self.renderer.document();
        self.renderer.runtime().untrack(|| {
            for key in fields.keys() {
                let item = fields.get_untracked(&key).unwrap_or_default();
                let child = self.render_child(&item, Value::from(key));
                document.append_child(self.el, child);
            }
        });
        *self.source.borrow_mut() = Some(Source::Object(fields));
    }

    /// Let go of the current source. Returns `false` if there was none.
    fn stop(&self) -> bool {
        match self.source.take() {
            Some(Source::List(list, id)) => {
                list.unobserve(id);
                true
            }
            Some(Source::Object(_)) => true,
            None => false,
        }
    }

    /// Unbind and release every rendered child.
    fn clear(&self) {
        for child in self.renderer.document().children(self.el) {
            self.release(child);
        }
    }

    fn release(&self, child: NodeId) {
        self.renderer.unbind(child);
        let document = self.renderer.document();
        document.remove_child(self.el, child);
        document.drop_node(child);
    }

    fn render_child(&self, item: &Value, index: Value) -> NodeId {
        let mut vars = vec![(self.names.item.clone(), item.clone())];
        if let Some(name) = &self.names.index {
            vars.push((name.clone(), index));
        }
        let mut ctx = self.ctx.child(vars);
        if let Value::Object(fields) = item {
            ctx = ctx.with_fields(fields.clone());
        }
        self.renderer
            .runtime()
            .untrack(|| self.renderer.render(&self.body, &self.vm, &ctx))
    }

    fn child_at(&self, index: usize) -> Option<NodeId> {
        self.renderer.document().children(self.el).get(index).copied()
    }
}

impl ListObserver for ForEach {
    fn append(&self, item: &Value, index: usize) {
        let child = self.render_child(item, Value::from(index));
        self.renderer.document().append_child(self.el, child);
    }

    fn remove(&self, index: usize) {
        if let Some(child) = self.child_at(index) {
            self.release(child);
        }
    }

    fn replace(&self, item: &Value, index: usize) {
        let child = self.render_child(item, Value::from(index));
        match self.child_at(index) {
            Some(old) => {
                self.renderer.unbind(old);
                let document = self.renderer.document();
                document.replace_child(self.el, child, old);
                document.drop_node(old);
            }
            None => self.renderer.document().append_child(self.el, child),
        }
    }
}

//! Child elements, and child components: an element whose tag names a
//! component held in the view model is replaced by that component's root.

use std::{cell::Cell, rc::Rc};

use strand_reactive::Value;

use super::{Step, StepList};
use crate::{document::NodeId, engine::Component, render::RenderState};

pub(super) fn compile(child: Rc<StepList>) -> Step {
    Box::new(move |state| {
        let name = child.tag();
        let runtime = state.renderer.runtime();
        let is_component = runtime
            .untrack(|| resolve(&state, name))
            .is_some_and(|value| value.downcast_ref::<Component>().is_some());
        if is_component {
            bind_component(&state, child.clone());
        } else {
            let node = state.renderer.render(&child, &state.vm, &state.ctx);
            state.document().append_child(state.el, node);
        }
        state
    })
}

fn resolve(state: &RenderState, name: &str) -> Option<Value> {
    let runtime = state.renderer.runtime();
    state
        .ctx
        .lookup(runtime, name)
        .or_else(|| state.vm.get(runtime, name))
}

/// The slot a child component occupies under its parent element.
struct Slot {
    node: Cell<Option<NodeId>>,
    /// Whether `node` is a stand-in this slot created, rather than the root
    /// of a component someone else owns.
    owned: Cell<bool>,
}

/// The binding is recorded on the parent and swaps the slot's node whenever
/// the field is written. A value that is not a component leaves an empty
/// element of the same tag in its place.
fn bind_component(state: &RenderState, child: Rc<StepList>) {
    let slot = Rc::new(Slot {
        node: Cell::new(None),
        owned: Cell::new(false),
    });
    state.renderer.bind_step(state, move |state| {
        let document = state.document();
        let value = resolve(state, child.tag()).unwrap_or_default();
        let (node, owned) = match value.downcast_ref::<Component>() {
            Some(component) => (component.root, false),
            None => {
                tracing::debug!(tag = child.tag(), "child component missing, using a stand-in");
                (document.create_element(child.tag()), true)
            }
        };

        match slot.node.replace(Some(node)) {
            Some(old) if old == node => return,
            Some(old) => {
                document.replace_child(state.el, node, old);
                if slot.owned.get() {
                    document.drop_node(old);
                }
            }
            None => document.append_child(state.el, node),
        }
        slot.owned.set(owned);
        tracing::trace!(tag = child.tag(), ?node, "child component placed");
    });
}

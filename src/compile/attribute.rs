use std::{cell::RefCell, rc::Rc};

use strand_reactive::Value;

use super::{Compiler, Step, Substitution};
use crate::{expression::Evaluator, markup::Attribute};

/// An attribute without the directive prefix. Static unless its value
/// contains expressions.
pub(super) fn plain(compiler: &Compiler, attribute: &Attribute) -> Step {
    dynamic(compiler, &attribute.name, &attribute.value)
}

/// A `u-NAME` attribute. Its value is re-rendered whenever an expression in
/// it changes; without expressions it is set once.
///
/// `on*` attributes holding exactly one expression are event handlers: a
/// function value is installed as the handler for the event, anything else
/// removes it.
pub(super) fn dynamic(compiler: &Compiler, name: &str, template: &str) -> Step {
    let Some(interpolation) = compiler.interpolation(template) else {
        let name: Rc<str> = name.into();
        let value: Rc<str> = template.into();
        return Box::new(move |state| {
            state.document().set_attribute(state.el, &name, &value);
            state
        });
    };

    if let (Some(event), Some(evaluator)) = (name.strip_prefix("on"), interpolation.single()) {
        return handler(event.into(), Rc::new(evaluator.clone()));
    }

    let name: Rc<str> = name.into();
    let interpolation = Rc::new(interpolation);
    Box::new(move |state| {
        let name = name.clone();
        let interpolation = interpolation.clone();
        state.renderer.bind_step(&state, move |state| {
            let value = interpolation.render(&state.env(), Substitution::Attribute);
            state.document().set_attribute(state.el, &name, &value);
        });
        state
    })
}

fn handler(event: Rc<str>, evaluator: Rc<Evaluator>) -> Step {
    Box::new(move |state| {
        let event = event.clone();
        let evaluator = evaluator.clone();
        state.renderer.bind_step(&state, move |state| {
            let handler = match evaluator.evaluate(&state.env()) {
                Some(Value::Function(callback)) => Some(callback),
                _ => None,
            };
            state.document().set_handler(state.el, &event, handler);
        });
        state
    })
}

/// `u-attr`: the expression decides whether an attribute is present.
///
/// The declared name is the expression source. `true` sets the declared name,
/// a non-empty string sets the attribute it names, anything else sets
/// nothing. Whatever a previous run set is removed first.
pub(super) fn toggle(compiler: &Compiler, attribute: &Attribute) -> Step {
    let source = compiler.strip_tags(&attribute.value);
    let evaluator = Rc::new(Evaluator::lenient(source));
    let declared: Rc<str> = source.into();
    Box::new(move |state| {
        let evaluator = evaluator.clone();
        let declared = declared.clone();
        let last: RefCell<Option<Rc<str>>> = RefCell::new(None);
        state.renderer.bind_step(&state, move |state| {
            let value = evaluator.evaluate(&state.env());
            let document = state.document();
            if let Some(name) = last.take() {
                document.remove_attribute(state.el, &name);
            }
            let name = match value {
                Some(Value::Bool(true)) => declared.clone(),
                Some(Value::String(name)) if !name.is_empty() => name,
                _ => return,
            };
            document.set_attribute(state.el, &name, "");
            *last.borrow_mut() = Some(name);
        });
        state
    })
}

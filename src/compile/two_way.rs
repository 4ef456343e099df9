use std::rc::Rc;

use strand_reactive::{Callback, Value};

use super::{Compiler, Step};
use crate::{
    error::{Error, Result},
    expression::Evaluator,
    markup::Attribute,
};

const INPUT: &str = "input";

/// `u-bind="path"`: the control's value follows `path`, and `input` events
/// write the control's value back to it.
///
/// The binding's single ledger entry also removes the input handler.
pub(super) fn compile(compiler: &Compiler, attribute: &Attribute) -> Result<Step> {
    let source = compiler.strip_tags(&attribute.value);
    let target = Rc::new(Evaluator::new(source).map_err(|error| Error::Expression {
        source_text: source.to_string(),
        error,
    })?);

    Ok(Box::new(move |state| {
        let write_back = state.clone();
        let assign = target.clone();
        let handler = Callback::new(move |_| {
            let value = write_back.document().value(write_back.el);
            write_back
                .renderer
                .runtime()
                .untrack(|| assign.assign(&write_back.env(), Value::from(value)));
            Value::Null
        });
        state
            .document()
            .set_handler(state.el, INPUT, Some(handler));

        let read = target.clone();
        let document = state.renderer.downgrade_document();
        let el = state.el;
        state.renderer.bind_step_with(
            &state,
            move |state| {
                let value = read
                    .evaluate(&state.env())
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                if state.document().value(state.el) != value {
                    state.document().set_value(state.el, &value);
                }
            },
            move || {
                if let Some(document) = document.upgrade() {
                    document.set_handler(el, INPUT, None);
                }
            },
        );
        state
    }))
}

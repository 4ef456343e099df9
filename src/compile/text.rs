use std::rc::Rc;

use super::{Compiler, Step, Substitution};

/// A text child. The text binding is recorded on the parent element.
pub(super) fn compile(compiler: &Compiler, content: &str) -> Step {
    let Some(interpolation) = compiler.interpolation(content) else {
        let content: Rc<str> = content.into();
        return Box::new(move |state| {
            let document = state.document();
            let node = document.create_text(&content);
            document.append_child(state.el, node);
            state
        });
    };

    let interpolation = Rc::new(interpolation);
    Box::new(move |state| {
        let node = state.document().create_text("");
        state.document().append_child(state.el, node);
        let interpolation = interpolation.clone();
        state.renderer.bind_step(&state, move |state| {
            let text = interpolation.render(&state.env(), Substitution::Text);
            state.document().set_text(node, &text);
        });
        state
    })
}

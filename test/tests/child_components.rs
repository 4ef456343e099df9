//! Components stored in a view model take the place of the element whose tag
//! names them, and are swapped when the field is written.

use std::rc::Rc;

use serde_json::json;
use strand_test::prelude::*;

fn setup() -> (Rc<MemoryDocument>, Engine) {
    let document = Rc::new(MemoryDocument::new());
    let engine = Engine::new(document.clone()).unwrap();
    (document, engine)
}

fn card(engine: &Engine, title: &str) -> Component {
    engine
        .component(
            r#"<article>{title}</article>"#,
            Model::from_json(json!({ "title": title })),
        )
        .unwrap()
}

#[test]
fn a_component_field_replaces_the_element() {
    let (document, engine) = setup();
    let vm = Model::new();
    vm.set("card", card(&engine, "one"));

    let page = engine
        .component(r#"<main><h1>top</h1><card></card></main>"#, vm)
        .unwrap();
    assert_eq!(
        document.to_html(page.root),
        "<main><h1>top</h1><article>one</article></main>"
    );
}

#[test]
fn writing_the_field_swaps_the_component() {
    let (document, engine) = setup();
    let vm = Model::new();
    vm.set("card", card(&engine, "one"));
    let page = engine
        .component(r#"<main><card></card><p>end</p></main>"#, vm.clone())
        .unwrap();

    vm.set("card", card(&engine, "two"));
    assert_eq!(
        document.to_html(page.root),
        "<main><article>two</article><p>end</p></main>"
    );

    // Without a component the slot holds an empty element of the same tag.
    vm.set("card", Value::Null);
    assert_eq!(document.to_html(page.root), "<main><card></card><p>end</p></main>");

    vm.set("card", engine.placeholder(Some("aside")));
    assert_eq!(document.to_html(page.root), "<main><aside></aside><p>end</p></main>");
}

#[test]
fn child_component_stays_reactive() {
    let (document, engine) = setup();
    let child = card(&engine, "one");
    let child_vm = child.vm.clone();
    let vm = Model::new();
    vm.set("card", child);
    let page = engine.component(r#"<main><card></card></main>"#, vm).unwrap();

    child_vm.set("title", "renamed");
    assert_eq!(document.to_html(page.root), "<main><article>renamed</article></main>");
}

#[test]
fn plain_fields_do_not_turn_elements_into_slots() {
    let (document, engine) = setup();
    let vm = Model::from_json(json!({ "b": "bold" }));
    let page = engine.component(r#"<p><b>{b}</b></p>"#, vm).unwrap();
    assert_eq!(document.to_html(page.root), "<p><b>bold</b></p>");
}

#[test]
fn placeholder_defaults_to_a_div() {
    let (document, engine) = setup();
    let placeholder = engine.placeholder(None);
    assert_eq!(document.to_html(placeholder.root), "<div></div>");
    assert!(placeholder.vm.is_empty());

    let vm = Model::new();
    vm.set("sidebar", placeholder);
    let page = engine.component(r#"<main><sidebar></sidebar></main>"#, vm.clone()).unwrap();
    assert_eq!(document.to_html(page.root), "<main><div></div></main>");

    vm.set("sidebar", card(&engine, "ready"));
    assert_eq!(document.to_html(page.root), "<main><article>ready</article></main>");
}

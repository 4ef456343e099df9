//! `u-bind` keeps a control's value and a model path in step both ways.

use serde_json::json;
use strand_test::prelude::*;

#[test]
fn model_writes_update_the_control() {
    let harness = TestHarness::new(r#"<input u-bind="{name}">"#, json!({ "name": "Ada" }));
    let input = harness.root();
    assert_eq!(harness.document().value(input), "Ada");

    harness.vm().set("name", "Grace");
    assert_eq!(harness.document().value(input), "Grace");
}

#[test]
fn input_events_write_back_to_the_model() {
    let harness = TestHarness::new(
        r#"<div><input u-bind="name"><p>{name}</p></div>"#,
        json!({ "name": "Ada" }),
    );
    let input = harness.child(&[0]);

    assert!(harness.input(input, "Linus"));
    assert_eq!(harness.vm().get_untracked("name"), Some(Value::from("Linus")));
    assert_eq!(harness.text(), "Linus");
    assert_eq!(harness.document().value(input), "Linus");
}

#[test]
fn member_and_index_targets_are_assignable() {
    let harness = TestHarness::new(
        r#"<div><input u-bind="user.name"><input u-bind="tags[1]"></div>"#,
        json!({ "user": { "name": "Ada" }, "tags": ["a", "b"] }),
    );
    assert_eq!(harness.document().value(harness.child(&[1])), "b");

    harness.input(harness.child(&[0]), "Grace");
    harness.input(harness.child(&[1]), "z");

    let user = harness.vm().get_untracked("user").unwrap();
    assert_eq!(
        user.as_model().unwrap().get_untracked("name"),
        Some(Value::from("Grace"))
    );
    assert_eq!(harness.list("tags").get_untracked(1), Some(Value::from("z")));
}

#[test]
fn loop_items_bind_through_their_fields() {
    let harness = TestHarness::new(
        r#"<div u-for="people as person"><input u-bind="name"></div>"#,
        json!({ "people": [{ "name": "Ada" }, { "name": "Grace" }] }),
    );
    harness.input(harness.child(&[1]), "Hopper");

    let second = harness.list("people").get_untracked(1).unwrap();
    assert_eq!(
        second.as_model().unwrap().get_untracked("name"),
        Some(Value::from("Hopper"))
    );
    // The view model itself is untouched.
    assert!(!harness.vm().contains_key("name"));
}

#[test]
fn loop_variables_are_not_assignable() {
    let harness = TestHarness::new(
        r#"<div u-for="tags as tag"><input u-bind="tag"></div>"#,
        json!({ "tags": ["a"] }),
    );
    let input = harness.child(&[0]);
    assert_eq!(harness.document().value(input), "a");

    assert!(harness.input(input, "b"));
    assert_eq!(harness.list("tags").get_untracked(0), Some(Value::from("a")));
}

#[test]
fn teardown_removes_the_input_handler() {
    let harness = TestHarness::new(r#"<input u-bind="name">"#, json!({ "name": "Ada" }));
    let input = harness.root();
    assert!(harness.document().has_handler(input, "input"));

    assert_eq!(harness.unbind(), 1);
    assert!(!harness.document().has_handler(input, "input"));
    assert!(!harness.input(input, "ignored"));
    assert_eq!(harness.vm().get_untracked("name"), Some(Value::from("Ada")));
}

#[test]
fn malformed_targets_fail_to_compile() {
    let engine = Engine::new(std::rc::Rc::new(MemoryDocument::new())).unwrap();
    assert!(matches!(
        engine.component(r#"<input u-bind="a +">"#, Model::new()),
        Err(strand::Error::Expression { .. })
    ));
}

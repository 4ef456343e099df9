//! Unbinding a subtree runs exactly one teardown per binding and leaves
//! nothing subscribed.

use serde_json::json;
use strand_test::prelude::*;

#[test]
fn unbind_runs_one_teardown_per_binding() {
    let harness = TestHarness::new(
        r#"<div u-for="items as item"><p class="{item}">{item}</p></div>"#,
        json!({ "items": ["a", "b"] }),
    );
    // The loop, plus a class and a text binding per item.
    assert_eq!(harness.live_bindings(), 5);

    assert_eq!(harness.unbind(), 5);
    assert_eq!(harness.live_bindings(), 0);
    assert!(!harness.engine().renderer().is_bound(harness.root()));
}

#[test]
fn unbound_nodes_stop_updating() {
    let harness = TestHarness::new(
        r#"<section title="{title}"><ul u-for="items as item"><li>{item}</li></ul></section>"#,
        json!({ "title": "t", "items": ["a"] }),
    );
    let items = harness.list("items");
    assert_eq!(items.observer_count(), 1);
    let before = harness.html();

    harness.unbind();
    assert_eq!(items.observer_count(), 0);
    assert_eq!(harness.vm().subscriber_count("title"), 0);

    harness.vm().set("title", "changed");
    items.push("b");
    items.set(0, "z");
    assert_eq!(harness.html(), before);
}

#[test]
fn unbinding_twice_is_harmless() {
    let harness = TestHarness::new(r#"<p>{a}</p>"#, json!({ "a": 1 }));
    assert_eq!(harness.unbind(), 1);
    assert_eq!(harness.unbind(), 0);
}

#[test]
fn removed_loop_children_release_their_bindings() {
    let harness = TestHarness::new(
        r#"<ul u-for="rows as row"><li u-for="row as cell"><span>{cell}</span></li></ul>"#,
        json!({ "rows": [["a", "b"], ["c"]] }),
    );
    // Outer loop, two inner loops and three cells.
    assert_eq!(harness.live_bindings(), 6);

    harness.list("rows").remove(0);
    assert_eq!(harness.live_bindings(), 3);
    assert_eq!(harness.text(), "c");
}

#[test]
fn bindings_created_match_teardowns_for_a_mixed_tree() {
    let harness = TestHarness::new(
        r#"<form>
            <input u-bind="name">
            <button onclick="{save}" u-attr="{busy}">{label}</button>
            <ol u-for="tags as tag, i"><li>{i}{tag}</li></ol>
        </form>"#,
        json!({ "name": "n", "busy": false, "label": "go", "tags": ["x"], "save": null }),
    );
    let created = harness.runtime().created_bindings();
    assert_eq!(created, harness.live_bindings());
    assert_eq!(harness.unbind(), created);
    assert!(!harness.document().has_handler(harness.child(&[0]), "input"));
}

//! Structural list updates reach rendered loops as append/remove/replace
//! operations on individual children.

use serde_json::json;
use strand_test::prelude::*;

const LETTERS: &str = r#"<ul u-for="items as item"><li>{item}</li></ul>"#;

fn letters() -> TestHarness {
    TestHarness::new(LETTERS, json!({ "items": ["a", "b", "c"] }))
}

#[test]
fn remove_replace_append() {
    let harness = letters();
    let renderer = harness.engine().renderer();
    let items = harness.list("items");
    assert_eq!(harness.child_texts(harness.root()), ["a", "b", "c"]);
    // One loop binding plus one text binding per item.
    assert_eq!(harness.live_bindings(), 4);

    let b = harness.child(&[1]);
    items.remove(1);
    assert_eq!(harness.child_texts(harness.root()), ["a", "c"]);
    assert_eq!(harness.live_bindings(), 3);
    assert!(!renderer.is_bound(b));
    assert_eq!(harness.document().parent(b), None);

    let a = harness.child(&[0]);
    let c = harness.child(&[1]);
    items.set(0, "z");
    assert_eq!(harness.child_texts(harness.root()), ["z", "c"]);
    assert_eq!(harness.live_bindings(), 3);
    assert!(!renderer.is_bound(a));
    assert_eq!(harness.child(&[1]), c);

    items.push("d");
    assert_eq!(harness.child_texts(harness.root()), ["z", "c", "d"]);
    assert_eq!(harness.live_bindings(), 4);
}

#[test]
fn insert_pop_swap_clear() {
    let harness = letters();
    let items = harness.list("items");

    items.insert(1, "x");
    assert_eq!(harness.child_texts(harness.root()), ["a", "x", "b", "c"]);

    assert_eq!(items.pop(), Some(Value::from("c")));
    assert_eq!(harness.child_texts(harness.root()), ["a", "x", "b"]);

    items.swap(0, 2);
    assert_eq!(harness.child_texts(harness.root()), ["b", "x", "a"]);

    items.clear();
    assert!(harness.child_texts(harness.root()).is_empty());
    assert_eq!(harness.live_bindings(), 1);

    items.push("again");
    assert_eq!(harness.child_texts(harness.root()), ["again"]);
}

#[test]
fn every_loop_over_a_list_is_updated() {
    let harness = TestHarness::new(
        r#"<div>
            <ul u-for="items as item"><li>{item}</li></ul>
            <ol u-for="items as entry, n"><li>{n}:{entry}</li></ol>
        </div>"#,
        json!({ "items": ["a", "b"] }),
    );
    let items = harness.list("items");
    assert_eq!(items.observer_count(), 2);

    items.push("c");
    items.remove(0);

    let ul = harness.child(&[0]);
    let ol = harness.child(&[1]);
    assert_eq!(harness.child_texts(ul), ["b", "c"]);
    // Indexes are bound when a child is rendered.
    assert_eq!(harness.child_texts(ol), ["1:b", "2:c"]);
}

#[test]
fn a_new_list_rebuilds_the_loop() {
    let harness = letters();
    let old = harness.list("items");
    let first = harness.child(&[0]);

    // Writing the same list back keeps every child.
    harness.vm().set("items", old.clone());
    assert_eq!(harness.child(&[0]), first);

    harness.vm().set("items", observe(json!(["p", "q"])));
    assert_eq!(harness.child_texts(harness.root()), ["p", "q"]);
    assert_eq!(old.observer_count(), 0);
    assert_eq!(harness.list("items").observer_count(), 1);
    assert_eq!(harness.live_bindings(), 3);

    old.push("stale");
    assert_eq!(harness.child_texts(harness.root()), ["p", "q"]);
}

#[test]
fn list_expressions_can_depend_on_other_fields() {
    let harness = TestHarness::new(
        r#"<ul u-for="(all ? everything : some) as item"><li>{item}</li></ul>"#,
        json!({ "all": false, "everything": [1, 2, 3], "some": [1] }),
    );
    assert_eq!(harness.child_texts(harness.root()), ["1"]);

    harness.vm().set("all", true);
    assert_eq!(harness.child_texts(harness.root()), ["1", "2", "3"]);

    harness.list("everything").push(4);
    assert_eq!(harness.child_texts(harness.root()), ["1", "2", "3", "4"]);
}

#[test]
fn missing_lists_render_nothing() {
    let harness = TestHarness::new(LETTERS, json!({ "items": null }));
    assert!(harness.child_texts(harness.root()).is_empty());

    harness.vm().set("items", observe(json!(["late"])));
    assert_eq!(harness.child_texts(harness.root()), ["late"]);
}

#[test]
fn object_items_expose_their_fields() {
    let harness = TestHarness::new(
        r#"<ul u-for="people as person"><li class="{role}">{person.name}</li></ul>"#,
        json!({ "people": [{ "name": "Ada", "role": "admin" }] }),
    );
    assert_eq!(harness.html(), r#"<ul><li class="admin">Ada</li></ul>"#);

    harness.list("people").push(observe(json!({ "name": "Linus", "role": "guest" })));
    assert_eq!(
        harness.html(),
        r#"<ul><li class="admin">Ada</li><li class="guest">Linus</li></ul>"#
    );
}

#[test]
fn removed_children_release_their_nodes() {
    let harness = TestHarness::new(LETTERS, json!({ "items": ["a"] }));
    let items = harness.list("items");
    // ul, li and its text.
    assert_eq!(harness.node_count(), 3);

    for _ in 0..100 {
        items.push("b");
        items.pop();
    }
    assert_eq!(harness.node_count(), 3);

    for letter in ["x", "y", "z"] {
        items.set(0, letter);
    }
    assert_eq!(harness.node_count(), 3);
    assert_eq!(harness.html(), "<ul><li>z</li></ul>");

    harness.vm().set("items", observe(json!(["p", "q"])));
    assert_eq!(harness.node_count(), 5);
    assert_eq!(harness.html(), "<ul><li>p</li><li>q</li></ul>");
}

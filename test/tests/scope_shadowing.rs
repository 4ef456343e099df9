//! Loop names shadow outer names only inside the loop body.

use serde_json::json;
use strand_test::prelude::*;

#[test]
fn nested_loops_may_reuse_names() {
    let harness = TestHarness::new(
        r#"<div u-for="rows as row, i"><ul u-for="row.cells as row, i"><li>{i}:{row}</li></ul></div>"#,
        json!({ "rows": [{ "cells": ["a", "b"] }, { "cells": ["c"] }] }),
    );
    assert_eq!(
        harness.html(),
        "<div><ul><li>0:a</li><li>1:b</li></ul><ul><li>0:c</li></ul></div>"
    );
}

#[test]
fn outer_loop_names_are_visible_in_inner_bodies() {
    let harness = TestHarness::new(
        r#"<div u-for="groups as group, g"><ul u-for="group.items as item"><li>{g}{group.name}/{item}</li></ul></div>"#,
        json!({ "groups": [{ "name": "x", "items": [1, 2] }, { "name": "y", "items": [3] }] }),
    );
    assert_eq!(harness.child_texts(harness.child(&[0])), ["0x/1", "0x/2"]);
    assert_eq!(harness.child_texts(harness.child(&[1])), ["1y/3"]);
}

#[test]
fn item_fields_shadow_the_view_model_inside_the_body_only() {
    let harness = TestHarness::new(
        r#"<section><h1>{name}</h1><ul u-for="groups as group"><li>{name}</li></ul></section>"#,
        json!({ "name": "top", "groups": [{ "name": "g1" }] }),
    );
    assert_eq!(
        harness.html(),
        "<section><h1>top</h1><ul><li>g1</li></ul></section>"
    );

    harness.vm().set("name", "renamed");
    assert_eq!(
        harness.html(),
        "<section><h1>renamed</h1><ul><li>g1</li></ul></section>"
    );
}

#[test]
fn loop_names_do_not_leak_to_siblings() {
    let harness = TestHarness::new(
        r#"<div><ul u-for="items as item"><li>{item}</li></ul><p>{item}</p></div>"#,
        json!({ "items": ["a"], "item": "outside" }),
    );
    assert_eq!(harness.text(), "aoutside");
}

use serde_json::json;
use strand_test::prelude::*;

fn button(value: serde_json::Value) -> TestHarness {
    TestHarness::new(
        r#"<button u-attr="{disabled}">go</button>"#,
        json!({ "disabled": value }),
    )
}

#[test]
fn true_sets_the_declared_name() {
    let harness = button(json!(true));
    assert_eq!(harness.attribute(harness.root(), "disabled").as_deref(), Some(""));
    assert_eq!(harness.html(), "<button disabled>go</button>");
}

#[test]
fn false_removes_the_attribute() {
    let harness = button(json!(true));
    harness.vm().set("disabled", false);
    assert_eq!(harness.attribute(harness.root(), "disabled"), None);
    assert_eq!(harness.html(), "<button>go</button>");

    harness.vm().set("disabled", true);
    assert_eq!(harness.html(), "<button disabled>go</button>");
}

#[test]
fn a_string_names_the_attribute() {
    let harness = button(json!("hidden"));
    let root = harness.root();
    assert_eq!(harness.attribute(root, "hidden").as_deref(), Some(""));
    assert_eq!(harness.attribute(root, "disabled"), None);

    harness.vm().set("disabled", "inert");
    assert_eq!(harness.attribute(root, "hidden"), None);
    assert_eq!(harness.attribute(root, "inert").as_deref(), Some(""));

    // `true` always means the declared name, whatever a string set before.
    harness.vm().set("disabled", true);
    assert_eq!(harness.attribute(root, "inert"), None);
    assert_eq!(harness.html(), "<button disabled>go</button>");
}

#[test]
fn true_after_a_string_sets_the_declared_name() {
    let harness = button(json!(false));
    harness.vm().set("disabled", "x");
    assert_eq!(harness.html(), "<button x>go</button>");
    harness.vm().set("disabled", true);
    assert_eq!(harness.html(), "<button disabled>go</button>");
    harness.vm().set("disabled", "");
    assert_eq!(harness.html(), "<button>go</button>");
}

#[test]
fn other_values_only_remove() {
    let harness = button(json!(true));
    harness.vm().set("disabled", Value::Null);
    assert_eq!(harness.html(), "<button>go</button>");
}

#[test]
fn each_instance_tracks_its_own_name() {
    let harness = TestHarness::new(
        r#"<div u-for="flags as flag"><input u-attr="{flag}"></div>"#,
        json!({ "flags": ["readonly", true] }),
    );
    assert_eq!(
        harness.html(),
        "<div><input readonly><input flag></div>"
    );
}

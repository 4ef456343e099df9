//! Loops over an object render one child per field, in insertion order, with
//! the key bound to the second loop name.

use serde_json::json;
use strand_test::prelude::*;

const LANGS: &str = r#"<dl u-for="langs as name, code"><dt>{code}={name}</dt></dl>"#;

fn langs() -> TestHarness {
    TestHarness::new(LANGS, json!({ "langs": { "en": "English", "fr": "French" } }))
}

fn langs_model(harness: &TestHarness) -> Model {
    harness
        .vm()
        .get_untracked("langs")
        .and_then(|value| value.as_model().cloned())
        .unwrap()
}

#[test]
fn renders_one_child_per_field() {
    let harness = langs();
    assert_eq!(
        harness.html(),
        "<dl><dt>en=English</dt><dt>fr=French</dt></dl>"
    );
    // Only the loop itself; children substitute loop names once.
    assert_eq!(harness.live_bindings(), 3);
}

#[test]
fn field_writes_redraw_the_loop() {
    let harness = langs();
    let langs = langs_model(&harness);

    langs.set("fr", "Francais");
    assert_eq!(
        harness.html(),
        "<dl><dt>en=English</dt><dt>fr=Francais</dt></dl>"
    );

    langs.set("de", "Deutsch");
    assert_eq!(harness.child_texts(harness.root()), ["en=English", "fr=Francais", "de=Deutsch"]);
    assert_eq!(harness.live_bindings(), 4);
    // dl, plus a dt and its text per field.
    assert_eq!(harness.node_count(), 7);
}

#[test]
fn switching_between_objects_and_lists() {
    let harness = langs();
    harness.vm().set("langs", observe(json!(["a", "b"])));
    assert_eq!(harness.html(), "<dl><dt>0=a</dt><dt>1=b</dt></dl>");

    let list = harness.list("langs");
    harness.vm().set("langs", observe(json!({ "k": "v" })));
    assert_eq!(harness.html(), "<dl><dt>k=v</dt></dl>");
    assert_eq!(list.observer_count(), 0);
    assert_eq!(harness.node_count(), 3);
}

#[test]
fn object_items_expose_their_fields() {
    let harness = TestHarness::new(
        r#"<ul u-for="people as person, id"><li>{id}:{name}</li></ul>"#,
        json!({ "people": { "a1": { "name": "Ada" }, "g2": { "name": "Grace" } } }),
    );
    assert_eq!(harness.child_texts(harness.root()), ["a1:Ada", "g2:Grace"]);
}

#[test]
fn unbinding_stops_redrawing() {
    let harness = langs();
    let langs = langs_model(&harness);
    assert_eq!(harness.unbind(), 3);
    let before = harness.html();
    langs.set("en", "Anglais");
    assert_eq!(harness.html(), before);
}

//! End to end: a text field bound to a store keeps focus and is never
//! rewritten while the user types.

use std::rc::Rc;

use ignite::prelude::*;
use pretty_assertions::assert_eq;

fn field_definition(store: &Rc<ReducerStore<String, String>>) -> ComponentDefinition<String, String> {
    ComponentDefinition::new(
        StoreSource::store(Rc::clone(store)),
        |args: &RenderArgs<String, String>| {
            let sender = args.sender();
            Renderable::from(vec![
                Renderable::from(
                    h("input")
                        .prop("value", args.state.as_str())
                        .prop(
                            "onInput",
                            PropValue::handler(move |event| sender.send(event.target().value())),
                        ),
                ),
                Renderable::from(h("p").child(format!("{} chars", args.state.chars().count()))),
            ])
        },
    )
    .with_config(IgniteConfig::default())
}

#[test]
fn typing_round_trips_through_the_store_without_value_writes() {
    let store = Rc::new(ReducerStore::new(String::new(), |_: &String, next: &String| {
        next.clone()
    }));
    let registry = ElementRegistry::new();
    registry.define("x-field", field_definition(&store)).unwrap();

    let doc = Document::new();
    let element = registry.create("x-field", &doc).unwrap();
    doc.body().append_child(element.host());
    element.connect().unwrap();

    let root = element
        .host()
        .shadow_root()
        .and_then(|shadow| shadow.first_child())
        .unwrap();
    let input = root.first_child().unwrap();
    input.focus();

    let before = doc.mutations();
    input.simulate_input("hi");
    let after = doc.mutations();

    assert_eq!(store.get_state(), "hi");
    assert_eq!(after.value_writes, before.value_writes);
    assert!(doc.active_element().is_some_and(|active| active.ptr_eq(&input)));
    assert!(root.first_child().is_some_and(|node| node.ptr_eq(&input)));
    assert_eq!(root.text_content(), "2 chars");
}

#[test]
fn shared_store_drives_every_instance() {
    let store = Rc::new(ReducerStore::new("x".to_string(), |_: &String, next: &String| {
        next.clone()
    }));
    let registry = ElementRegistry::new();
    registry.define("x-field", field_definition(&store)).unwrap();

    let doc = Document::new();
    let a = registry.create("x-field", &doc).unwrap();
    let b = registry.create("x-field", &doc).unwrap();
    a.connect().unwrap();
    b.connect().unwrap();

    store.dispatch("abc".into());
    for element in [&a, &b] {
        let text = element.host().shadow_root().unwrap().text_content();
        assert_eq!(text, "3 chars");
    }
}

//! Tree and counter behavior through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use ignite_dom::{Document, EventListener, Namespace, NodeType, inner_html};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn svg_elements_keep_their_namespace() {
    let doc = Document::new();
    let svg = doc.create_element_ns("svg", Namespace::Svg);
    let rect = doc.create_element_ns("rect", Namespace::Svg);
    svg.append_child(&rect);
    assert_eq!(rect.namespace(), Some(Namespace::Svg));
    assert_eq!(Namespace::from_uri(Namespace::SVG_URI), Namespace::Svg);
    assert!(!rect.has_property("id"));
}

#[test]
fn shadow_root_is_separate_from_light_children() {
    let doc = Document::new();
    let host = doc.create_element("x-card");
    host.append_child(&doc.create_text_node("light"));
    let shadow = host.attach_shadow();
    shadow.append_child(&doc.create_element("slot"));

    assert!(host.attach_shadow().ptr_eq(&shadow));
    assert_eq!(shadow.node_type(), NodeType::ShadowRoot);
    assert!(shadow.shadow_host().is_some_and(|h| h.ptr_eq(&host)));
    assert_eq!(inner_html(&host), "light");
    assert_eq!(inner_html(&shadow), "<slot></slot>");
}

#[test]
fn listeners_run_in_registration_order() {
    let doc = Document::new();
    let button = doc.create_element("button");
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let log = Rc::clone(&log);
        button.add_event_listener("click", EventListener::new(move |_| log.borrow_mut().push(name)));
    }
    button.click();
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn stop_propagation_halts_bubbling() {
    let doc = Document::new();
    let outer = doc.create_element("div");
    let inner = doc.create_element("span");
    outer.append_child(&inner);
    let reached = Rc::new(RefCell::new(false));
    let r = Rc::clone(&reached);
    outer.add_event_listener("click", EventListener::new(move |_| *r.borrow_mut() = true));
    inner.add_event_listener("click", EventListener::new(|e| e.stop_propagation()));
    inner.click();
    assert!(!*reached.borrow());
}

#[test]
fn composition_events_fire() {
    let doc = Document::new();
    let input = doc.create_element("input");
    let seen = Rc::new(RefCell::new(Vec::new()));
    for ty in ["compositionstart", "compositionend", "input"] {
        let seen = Rc::clone(&seen);
        input.add_event_listener(ty, EventListener::new(move |e| {
            seen.borrow_mut().push(e.event_type().to_string());
        }));
    }
    input.set_composing(true);
    assert!(input.is_composing());
    input.simulate_input("かな");
    input.set_composing(false);
    assert_eq!(
        *seen.borrow(),
        vec!["compositionstart", "input", "compositionend"]
    );
}

proptest! {
    #[test]
    fn replace_children_preserves_order(labels in prop::collection::vec("[a-z]{1,4}", 0..12)) {
        let doc = Document::new();
        let parent = doc.create_element("div");
        parent.append_child(&doc.create_text_node("stale"));
        let nodes: Vec<_> = labels.iter().map(|l| doc.create_text_node(l)).collect();
        parent.replace_children(&nodes);
        prop_assert_eq!(parent.child_count(), labels.len());
        prop_assert_eq!(parent.text_content(), labels.concat());
    }

    #[test]
    fn counters_only_grow(ops in prop::collection::vec(0u8..4, 1..40)) {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.body().append_child(&el);
        let mut last = doc.mutations().total();
        for op in ops {
            match op {
                0 => el.set_attribute("data-x", "1"),
                1 => el.remove_attribute("data-x"),
                2 => el.append_child(&doc.create_text_node("t")),
                _ => el.clear_children(),
            }
            let now = doc.mutations().total();
            prop_assert!(now >= last);
            last = now;
        }
    }
}

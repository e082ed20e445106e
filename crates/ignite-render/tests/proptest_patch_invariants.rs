//! Property-based invariant tests for the patch engine.
//!
//! 1. Rendering the same view twice performs no DOM mutation.
//! 2. Appending trailing children never falls back.
//! 3. Permuting distinct children reports `child-order-change` and the
//!    result matches a full replace.
//! 4. Whatever happens, the patched DOM equals a fresh mount of the view.

use std::cell::RefCell;

use ignite_dom::{Document, Node, outer_html};
use ignite_render::{Fallback, FallbackReason, PatchOptions, Renderable, h, mount, render};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn leaf() -> impl Strategy<Value = Renderable> {
    prop_oneof![
        "[a-c]{0,3}".prop_map(Renderable::Text),
        Just(Renderable::Null),
        Just(Renderable::Bool(false)),
        (0u8..10).prop_map(|n| Renderable::Number(f64::from(n))),
    ]
}

fn tree() -> impl Strategy<Value = Renderable> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec!["div", "span", "p", "input"]),
                prop::option::of("[xy]{1,2}"),
                prop::collection::vec(inner.clone(), 0..4),
            )
                .prop_map(|(tag, class, children)| {
                    let mut el = h(tag);
                    if let Some(class) = class {
                        el = el.prop("class", class);
                    }
                    if tag == "input" {
                        el = el.prop("value", "v");
                    }
                    el.children(children).into()
                }),
            prop::collection::vec(inner, 0..4).prop_map(Renderable::List),
        ]
    })
}

fn host(doc: &Document) -> Node {
    let host = doc.create_element("section");
    doc.body().append_child(&host);
    host
}

fn fresh_html(view: &Renderable) -> String {
    let doc = Document::new();
    let host = host(&doc);
    mount(&host, view);
    outer_html(&host)
}

fn render_collecting(
    host: &Node,
    view: &Renderable,
    previous: &[ignite_render::VNode],
) -> (Vec<ignite_render::VNode>, Vec<FallbackReason>) {
    let seen = RefCell::new(Vec::new());
    let hook = |f: &Fallback| seen.borrow_mut().push(f.reason);
    let options = PatchOptions::default().with_fallback(&hook);
    let next = render(host, view, Some(previous), &options);
    (next, seen.into_inner())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_render_is_mutation_free(view in tree()) {
        let doc = Document::new();
        let host = host(&doc);
        let first = mount(&host, &view);
        let before = doc.mutations();
        let (second, reasons) = render_collecting(&host, &view, &first);
        let (_, reasons_again) = render_collecting(&host, &view, &second);
        prop_assert_eq!(doc.mutations(), before);
        prop_assert!(reasons.is_empty() && reasons_again.is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Append-only lists
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn appending_never_falls_back(
        prefix in prop::collection::vec(tree(), 1..5),
        extra in prop::collection::vec(tree(), 0..4),
    ) {
        let doc = Document::new();
        let host = host(&doc);
        let before_view = Renderable::List(prefix.clone());
        let previous = mount(&host, &before_view);

        let mut combined = prefix;
        combined.extend(extra);
        let next_view = Renderable::List(combined);
        let (_, reasons) = render_collecting(&host, &next_view, &previous);
        prop_assert!(reasons.is_empty(), "unexpected fallbacks: {:?}", reasons);
        prop_assert_eq!(outer_html(&host), fresh_html(&next_view));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Reorder detection
// ═════════════════════════════════════════════════════════════════════════

fn permuted_labels() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    prop::collection::hash_set("[a-z]{1,3}", 2..6)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|labels| (Just(labels.clone()), Just(labels).prop_shuffle()))
}

fn span_list(labels: &[String]) -> Renderable {
    labels
        .iter()
        .map(|label| Renderable::from(h("span").child(label.as_str())))
        .collect()
}

proptest! {
    #[test]
    fn permutations_report_child_order_change((before, after) in permuted_labels()) {
        prop_assume!(before != after);
        let doc = Document::new();
        let host = host(&doc);
        let previous = mount(&host, &span_list(&before));
        let next_view = span_list(&after);
        let (_, reasons) = render_collecting(&host, &next_view, &previous);
        prop_assert_eq!(reasons, vec![FallbackReason::ChildOrderChange]);
        prop_assert_eq!(host.text_content(), after.concat());
        prop_assert_eq!(outer_html(&host), fresh_html(&next_view));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Convergence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn patched_dom_matches_fresh_mount(a in tree(), b in tree()) {
        let doc = Document::new();
        let host = host(&doc);
        let previous = mount(&host, &a);
        let (next, _) = render_collecting(&host, &b, &previous);
        prop_assert_eq!(outer_html(&host), fresh_html(&b));
        prop_assert_eq!(next, ignite_render::normalize(&b, None));
    }
}

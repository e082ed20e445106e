#![no_main]

//! Patch any tree into any other; the DOM must equal a fresh mount.

use arbitrary::Arbitrary;
use ignite_core::PatchMode;
use ignite_dom::{Document, outer_html};
use ignite_render::{NoDiffRegistry, PatchOptions, Renderable, h, mount, normalize, render};
use libfuzzer_sys::fuzz_target;

const TAGS: &[&str] = &["div", "span", "input", "svg", "circle", "foreignObject", "x-deny"];

#[derive(Arbitrary, Debug)]
enum FuzzNode {
    Null,
    Flag(bool),
    Text(u8),
    Number(i16),
    Element {
        tag: u8,
        class: Option<u8>,
        value: Option<u8>,
        children: Vec<FuzzNode>,
    },
    List(Vec<FuzzNode>),
}

impl FuzzNode {
    fn to_renderable(&self, depth: usize) -> Renderable {
        if depth > 6 {
            return Renderable::Null;
        }
        match self {
            Self::Null => Renderable::Null,
            Self::Flag(flag) => Renderable::Bool(*flag),
            Self::Text(n) => Renderable::Text(format!("t{}", n % 8)),
            Self::Number(n) => Renderable::Number(f64::from(*n)),
            Self::Element {
                tag,
                class,
                value,
                children,
            } => {
                let mut el = h(TAGS[usize::from(*tag) % TAGS.len()]);
                if let Some(class) = class {
                    el = el.prop("class", format!("c{}", class % 4));
                }
                if let Some(value) = value {
                    el = el.prop("value", format!("v{}", value % 4));
                }
                el.children(children.iter().take(8).map(|c| c.to_renderable(depth + 1)))
                    .into()
            }
            Self::List(items) => {
                Renderable::List(items.iter().take(8).map(|c| c.to_renderable(depth + 1)).collect())
            }
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Input {
    before: FuzzNode,
    after: FuzzNode,
    replace: bool,
}

fuzz_target!(|input: Input| {
    let before = input.before.to_renderable(0);
    let after = input.after.to_renderable(0);

    let doc = Document::new();
    let host = doc.create_element("section");
    doc.body().append_child(&host);
    let denylist = NoDiffRegistry::with_tags(["x-deny"]);
    let mut options = PatchOptions::default().with_denylist(&denylist);
    if input.replace {
        options = options.with_mode(PatchMode::Replace);
    }

    let previous = mount(&host, &before);
    let next = render(&host, &after, Some(previous.as_slice()), &options);
    assert_eq!(next, normalize(&after, None));

    let fresh_doc = Document::new();
    let fresh = fresh_doc.create_element("section");
    mount(&fresh, &after);
    assert_eq!(outer_html(&host), outer_html(&fresh));
});

#![forbid(unsafe_code)]

//! HTML serialization for assertions and debugging.
//!
//! Shadow trees are not serialized; call [`inner_html`] on the shadow root
//! directly to inspect rendered content.

use crate::node::{Namespace, Node, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize `node` including its own tag.
#[must_use]
pub fn outer_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serialize the children of `node`.
#[must_use]
pub fn inner_html(node: &Node) -> String {
    let mut out = String::new();
    for child in node.child_nodes() {
        write_node(&child, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    let element = {
        let data = node.inner.borrow();
        match &data.kind {
            NodeKind::Text(text) => {
                escape_into(text, false, out);
                return;
            }
            NodeKind::Comment(label) => {
                out.push_str("<!--");
                out.push_str(label);
                out.push_str("-->");
                return;
            }
            NodeKind::Document | NodeKind::ShadowRoot { .. } => None,
            NodeKind::Element(el) => Some((el.tag.clone(), el.namespace)),
        }
    };
    let Some((tag, namespace)) = element else {
        out.push_str(&inner_html(node));
        return;
    };

    out.push('<');
    out.push_str(&tag);
    for name in node.attribute_names() {
        let value = node.get_attribute(&name).unwrap_or_default();
        out.push(' ');
        out.push_str(&name);
        if !value.is_empty() {
            out.push_str("=\"");
            escape_into(&value, true, out);
            out.push('"');
        }
    }
    out.push('>');

    if namespace == Namespace::Html && VOID_ELEMENTS.contains(&tag.as_str()) {
        return;
    }
    out.push_str(&inner_html(node));
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

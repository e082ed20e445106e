#![forbid(unsafe_code)]

//! Renderable → flat list of [`VNode`]s.

use ignite_dom::Namespace;
use ignite_dom::element::format_number;

use crate::props::Props;
use crate::renderable::{Descriptor, ElementType, Renderable};
use crate::vnode::{ElementNode, VNode};

/// Tag that switches itself and its descendants into the SVG namespace.
pub const SVG_ROOT_TAG: &str = "svg";
/// SVG element whose children return to the HTML namespace.
pub const NAMESPACE_ESCAPE_TAG: &str = "foreignObject";
/// Tag whose children are never rendered through the engine.
pub const SLOT_TAG: &str = "slot";

/// Label prefix for values the normalizer cannot render.
pub const UNRENDERABLE_LABEL: &str = "ignite:unrenderable";

/// Normalize `input` within `namespace` (`None` = HTML).
#[must_use]
pub fn normalize(input: &Renderable, namespace: Option<Namespace>) -> Vec<VNode> {
    let mut out = Vec::new();
    normalize_into(input, namespace, &mut out);
    out
}

fn normalize_into(input: &Renderable, namespace: Option<Namespace>, out: &mut Vec<VNode>) {
    match input {
        Renderable::Null | Renderable::Undefined | Renderable::Bool(_) => {
            out.push(VNode::placeholder());
        }
        Renderable::Text(text) => out.push(VNode::text(text.as_str())),
        Renderable::Number(n) => out.push(VNode::text(format_number(*n))),
        Renderable::List(items) => {
            for item in items {
                normalize_into(item, namespace, out);
            }
        }
        Renderable::Element(descriptor) => normalize_descriptor(descriptor, namespace, out),
        Renderable::Opaque(type_name) => {
            tracing::debug!(type_name = %type_name, "unrenderable value");
            out.push(VNode::comment(format!("{UNRENDERABLE_LABEL} {type_name}")));
        }
    }
}

fn normalize_descriptor(descriptor: &Descriptor, namespace: Option<Namespace>, out: &mut Vec<VNode>) {
    match &descriptor.element_type {
        ElementType::Fragment => {
            for child in &descriptor.children {
                normalize_into(child, namespace, out);
            }
        }
        ElementType::Component(component) => {
            let rendered = component.call(&descriptor.props, &descriptor.children);
            normalize_into(&rendered, namespace, out);
        }
        ElementType::Tag(tag) => {
            let own = if tag == SVG_ROOT_TAG {
                Some(Namespace::Svg)
            } else {
                namespace
            };
            let inner = if tag == NAMESPACE_ESCAPE_TAG && own == Some(Namespace::Svg) {
                None
            } else {
                own
            };
            let children = if tag == SLOT_TAG {
                Vec::new()
            } else {
                let mut children = Vec::with_capacity(descriptor.children.len());
                for child in &descriptor.children {
                    normalize_into(child, inner, &mut children);
                }
                children
            };
            out.push(VNode::Element(ElementNode {
                tag: tag.clone(),
                props: element_props(&descriptor.props),
                children,
                namespace: own,
            }));
        }
    }
}

// `children` and `key` are structural, never DOM props.
fn element_props(props: &Props) -> Props {
    props
        .iter()
        .filter(|(name, _)| !matches!(name.as_str(), "children" | "key"))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

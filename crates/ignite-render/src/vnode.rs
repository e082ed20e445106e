#![forbid(unsafe_code)]

//! Virtual node model.

use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use ignite_dom::Namespace;

use crate::props::{PropValue, Props};

// Fixed seeds keep fingerprints stable across runs and processes.
const FINGERPRINT_SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// Kind of a virtual node, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VNodeKind {
    Element,
    Text,
    Comment,
}

impl VNodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Text => "text",
            Self::Comment => "comment",
        }
    }
}

/// A virtual element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub props: Props,
    pub children: Vec<VNode>,
    /// `None` for HTML, `Some(Namespace::Svg)` inside an SVG subtree.
    pub namespace: Option<Namespace>,
}

impl ElementNode {
    /// Namespace the live element is created in.
    #[must_use]
    pub fn dom_namespace(&self) -> Namespace {
        self.namespace.unwrap_or_default()
    }
}

/// A normalized, comparable description of one DOM unit.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element(ElementNode),
    Text { value: String },
    Comment { label: Option<String> },
}

impl VNode {
    /// HTML element with no props or children.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(ElementNode {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
            namespace: None,
        })
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Placeholder for content that renders nothing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Comment { label: None }
    }

    #[must_use]
    pub fn comment(label: impl Into<String>) -> Self {
        Self::Comment {
            label: Some(label.into()),
        }
    }

    /// Builder: add a prop (elements only).
    #[must_use]
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        if let Self::Element(el) = &mut self {
            el.props.insert(name.into(), value.into());
        }
        self
    }

    /// Builder: append a child (elements only).
    #[must_use]
    pub fn with_child(mut self, child: VNode) -> Self {
        if let Self::Element(el) = &mut self {
            el.children.push(child);
        }
        self
    }

    #[must_use]
    pub fn kind(&self) -> VNodeKind {
        match self {
            Self::Element(_) => VNodeKind::Element,
            Self::Text { .. } => VNodeKind::Text,
            Self::Comment { .. } => VNodeKind::Comment,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        match self {
            Self::Text { value } => value.clone(),
            Self::Comment { .. } => String::new(),
            Self::Element(el) => el.children.iter().map(VNode::text_content).collect(),
        }
    }

    /// Structural fingerprint used for reorder detection.
    ///
    /// Elements hash tag, namespace, and their children's fingerprints; text
    /// and comments hash their literal content. Props are not included.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let (k0, k1, k2, k3) = FINGERPRINT_SEEDS;
        let mut hasher = RandomState::with_seeds(k0, k1, k2, k3).build_hasher();
        self.hash_structure(&mut hasher);
        hasher.finish()
    }

    fn hash_structure(&self, state: &mut impl Hasher) {
        self.kind().hash(state);
        match self {
            Self::Element(el) => {
                el.tag.hash(state);
                el.dom_namespace().hash(state);
                el.children.len().hash(state);
                for child in &el.children {
                    child.fingerprint().hash(state);
                }
            }
            Self::Text { value } => value.hash(state),
            Self::Comment { label } => label.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_props() {
        let a = VNode::element("span").with_prop("class", "x").with_child(VNode::text("A"));
        let b = VNode::element("span").with_child(VNode::text("A"));
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_sees_children_and_namespace() {
        let a = VNode::element("span").with_child(VNode::text("A"));
        let b = VNode::element("span").with_child(VNode::text("B"));
        assert_ne!(a.fingerprint(), b.fingerprint());

        let mut svg = VNode::element("a");
        if let VNode::Element(el) = &mut svg {
            el.namespace = Some(Namespace::Svg);
        }
        assert_ne!(svg.fingerprint(), VNode::element("a").fingerprint());
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let node = VNode::element("ul").with_child(VNode::element("li"));
        assert_eq!(node.fingerprint(), node.clone().fingerprint());
    }
}

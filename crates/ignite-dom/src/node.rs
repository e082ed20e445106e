#![forbid(unsafe_code)]

//! Node handles and tree operations.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::document::{Document, DocumentInner};
use crate::element::ElementData;

/// Element namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

impl Namespace {
    pub const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
    pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";

    pub const fn uri(self) -> &'static str {
        match self {
            Self::Html => Self::HTML_URI,
            Self::Svg => Self::SVG_URI,
        }
    }

    /// Resolve a namespace URI. Unknown URIs are treated as HTML.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        if uri == Self::SVG_URI {
            Self::Svg
        } else {
            Self::Html
        }
    }
}

/// Kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    ShadowRoot,
}

pub(crate) enum NodeKind {
    Document,
    Element(Box<ElementData>),
    Text(String),
    Comment(String),
    ShadowRoot { host: Weak<RefCell<NodeData>> },
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<Weak<RefCell<NodeData>>>,
    pub(crate) children: Vec<Node>,
    pub(crate) document: Weak<DocumentInner>,
}

/// Shared handle to a live node. Cloning yields another handle to the same
/// node; equality is identity.
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Rc<RefCell<NodeData>>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        match &data.kind {
            NodeKind::Document => f.write_str("#document"),
            NodeKind::Element(el) => write!(f, "<{}> ({} children)", el.tag, data.children.len()),
            NodeKind::Text(text) => write!(f, "#text {text:?}"),
            NodeKind::Comment(label) => write!(f, "#comment {label:?}"),
            NodeKind::ShadowRoot { .. } => write!(f, "#shadow-root ({} children)", data.children.len()),
        }
    }
}

impl Node {
    pub(crate) fn from_kind(kind: NodeKind, document: Weak<DocumentInner>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeData {
                kind,
                parent: None,
                children: Vec::new(),
                document,
            })),
        }
    }

    pub(crate) fn from_rc(inner: Rc<RefCell<NodeData>>) -> Self {
        Self { inner }
    }

    pub(crate) fn doc_inner(&self) -> Option<Rc<DocumentInner>> {
        self.inner.borrow().document.upgrade()
    }

    pub(crate) fn with_counters(&self, f: impl FnOnce(&crate::MutationCounters)) {
        if let Some(doc) = self.doc_inner() {
            f(&doc.counters);
        }
    }

    // ── Identity & kind ──────────────────────────────────────────────

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self.inner.borrow().kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
            NodeKind::ShadowRoot { .. } => NodeType::ShadowRoot,
        }
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    /// Document that created this node, if it is still alive.
    #[must_use]
    pub fn owner_document(&self) -> Option<Document> {
        self.doc_inner().and_then(Document::from_inner)
    }

    // ── Character data ───────────────────────────────────────────────

    /// Text of a text node or label of a comment.
    #[must_use]
    pub fn data(&self) -> Option<String> {
        match &self.inner.borrow().kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Overwrite the text of a text or comment node.
    pub fn set_data(&self, value: &str) {
        {
            let mut data = self.inner.borrow_mut();
            match &mut data.kind {
                NodeKind::Text(text) | NodeKind::Comment(text) => {
                    text.clear();
                    text.push_str(value);
                }
                _ => return,
            }
        }
        self.with_counters(|c| c.text_written());
    }

    /// Concatenated text of all descendant text nodes. Shadow trees are not
    /// included.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let data = self.inner.borrow();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            _ => {
                for child in &data.children {
                    child.collect_text(out);
                }
            }
        }
    }

    // ── Tree navigation ──────────────────────────────────────────────

    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.inner
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node::from_rc)
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    #[must_use]
    pub fn child_at(&self, index: usize) -> Option<Node> {
        self.inner.borrow().children.get(index).cloned()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Node> {
        self.child_at(0)
    }

    /// Whether `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_inclusive_descendant_of(&self, other: &Node) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(other) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Whether the node is reachable from its document, crossing shadow
    /// boundaries through their hosts.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            let next = {
                let data = node.inner.borrow();
                match &data.kind {
                    NodeKind::Document => return true,
                    NodeKind::ShadowRoot { host } => host.upgrade().map(Node::from_rc),
                    _ => data.parent.as_ref().and_then(Weak::upgrade).map(Node::from_rc),
                }
            };
            current = next;
        }
        false
    }

    // ── Tree mutation ────────────────────────────────────────────────

    fn can_adopt(&self, child: &Node) -> bool {
        if self.is_inclusive_descendant_of(child) {
            tracing::warn!(parent = ?self, child = ?child, "refusing to create a cycle");
            return false;
        }
        matches!(
            self.node_type(),
            NodeType::Document | NodeType::Element | NodeType::ShadowRoot
        )
    }

    fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .inner
            .borrow_mut()
            .children
            .retain(|c| !c.ptr_eq(self));
        self.inner.borrow_mut().parent = None;
        self.with_counters(|c| c.node_removed());
    }

    /// Append `child`, detaching it from its current parent first.
    pub fn append_child(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Insert `child` before `reference` (append when `None` or when
    /// `reference` is not a child of `self`).
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
        if !self.can_adopt(child) {
            return;
        }
        child.detach();
        child.inner.borrow_mut().parent = Some(Rc::downgrade(&self.inner));
        {
            let mut data = self.inner.borrow_mut();
            let index = reference
                .and_then(|r| data.children.iter().position(|c| c.ptr_eq(r)))
                .unwrap_or(data.children.len());
            data.children.insert(index, child.clone());
        }
        self.with_counters(|c| c.node_inserted());
    }

    /// Remove `child` if it is a child of `self`.
    pub fn remove_child(&self, child: &Node) -> bool {
        match child.parent() {
            Some(parent) if parent.ptr_eq(self) => {
                child.detach();
                true
            }
            _ => false,
        }
    }

    /// Replace `old` with `new`. Returns false when `old` is not a child.
    pub fn replace_child(&self, new: &Node, old: &Node) -> bool {
        if new.ptr_eq(old) {
            return true;
        }
        let is_child = old.parent().is_some_and(|p| p.ptr_eq(self));
        if !is_child || !self.can_adopt(new) {
            return false;
        }
        self.insert_before(new, Some(old));
        old.detach();
        true
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) {
        self.detach();
    }

    /// Remove every child.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.inner.borrow_mut().children);
        for child in &children {
            child.inner.borrow_mut().parent = None;
            self.with_counters(|c| c.node_removed());
        }
    }

    /// Remove every child, then append `children` in order.
    pub fn replace_children(&self, children: &[Node]) {
        self.clear_children();
        for child in children {
            self.append_child(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn append_moves_between_parents() {
        let doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let t = doc.create_text_node("x");
        a.append_child(&t);
        b.append_child(&t);
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(t.parent().is_some_and(|p| p.ptr_eq(&b)));
    }

    #[test]
    fn insert_before_and_replace() {
        let doc = Document::new();
        let root = doc.create_element("ul");
        let one = doc.create_text_node("1");
        let three = doc.create_text_node("3");
        root.append_child(&one);
        root.append_child(&three);
        let two = doc.create_text_node("2");
        root.insert_before(&two, Some(&three));
        assert_eq!(root.text_content(), "123");

        let four = doc.create_text_node("4");
        assert!(root.replace_child(&four, &three));
        assert_eq!(root.text_content(), "124");
        assert!(three.parent().is_none());
    }

    #[test]
    fn refuses_cycles() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        outer.append_child(&inner);
        inner.append_child(&outer);
        assert!(outer.parent().is_none());
        assert_eq!(inner.child_count(), 0);
    }

    #[test]
    fn connectivity_crosses_shadow_roots() {
        let doc = Document::new();
        let host = doc.create_element("x-host");
        let shadow = host.attach_shadow();
        let leaf = doc.create_element("span");
        shadow.append_child(&leaf);
        assert!(!leaf.is_connected());
        doc.body().append_child(&host);
        assert!(leaf.is_connected());
        host.remove();
        assert!(!leaf.is_connected());
    }

    #[test]
    fn text_content_skips_comments() {
        let doc = Document::new();
        let root = doc.create_element("p");
        root.append_child(&doc.create_text_node("a"));
        root.append_child(&doc.create_comment("hidden"));
        root.append_child(&doc.create_text_node("b"));
        assert_eq!(root.text_content(), "ab");
    }
}

#![forbid(unsafe_code)]

//! Documents: node factory, focus, and mutation counters.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::counters::{MutationCounters, MutationSnapshot};
use crate::element::ElementData;
use crate::node::{Namespace, Node, NodeData, NodeKind};

pub(crate) struct DocumentInner {
    pub(crate) counters: MutationCounters,
    root: RefCell<Weak<RefCell<NodeData>>>,
    body: RefCell<Weak<RefCell<NodeData>>>,
    active: RefCell<Option<Weak<RefCell<NodeData>>>>,
}

/// A document owning a root node and a `<body>`.
///
/// Cloning yields another handle to the same document. Nodes reference their
/// document weakly, so the tree is kept alive by `Document` handles (and by
/// any node handles the caller holds).
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
    root: Node,
    body: Node,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("mutations", &self.inner.counters.snapshot())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let inner = Rc::new(DocumentInner {
            counters: MutationCounters::default(),
            root: RefCell::new(Weak::new()),
            body: RefCell::new(Weak::new()),
            active: RefCell::new(None),
        });
        let root = Node::from_kind(NodeKind::Document, Rc::downgrade(&inner));
        let body = Node::from_kind(
            NodeKind::Element(Box::new(ElementData::new("body", Namespace::Html))),
            Rc::downgrade(&inner),
        );
        root.append_child(&body);
        *inner.root.borrow_mut() = Rc::downgrade(&root.inner);
        *inner.body.borrow_mut() = Rc::downgrade(&body.inner);
        Self { inner, root, body }
    }

    pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Option<Self> {
        let root = inner.root.borrow().upgrade().map(Node::from_rc)?;
        let body = inner.body.borrow().upgrade().map(Node::from_rc)?;
        Some(Self { inner, root, body })
    }

    /// The document node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> &Node {
        &self.body
    }

    /// Create an HTML element.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Node {
        self.create_element_ns(tag, Namespace::Html)
    }

    /// Create an element in `namespace`.
    #[must_use]
    pub fn create_element_ns(&self, tag: &str, namespace: Namespace) -> Node {
        Node::from_kind(
            NodeKind::Element(Box::new(ElementData::new(tag, namespace))),
            Rc::downgrade(&self.inner),
        )
    }

    #[must_use]
    pub fn create_text_node(&self, text: &str) -> Node {
        Node::from_kind(NodeKind::Text(text.to_string()), Rc::downgrade(&self.inner))
    }

    #[must_use]
    pub fn create_comment(&self, label: &str) -> Node {
        Node::from_kind(
            NodeKind::Comment(label.to_string()),
            Rc::downgrade(&self.inner),
        )
    }

    pub(crate) fn create_shadow_root(&self, host: &Node) -> Node {
        Node::from_kind(
            NodeKind::ShadowRoot {
                host: Rc::downgrade(&host.inner),
            },
            Rc::downgrade(&self.inner),
        )
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Move focus to `node`.
    pub fn focus(&self, node: &Node) {
        *self.inner.active.borrow_mut() = Some(Rc::downgrade(&node.inner));
    }

    /// Clear focus.
    pub fn blur(&self) {
        *self.inner.active.borrow_mut() = None;
    }

    /// Focused node, if it is still connected. Removing the focused node
    /// from the tree loses focus, as in a browser.
    #[must_use]
    pub fn active_element(&self) -> Option<Node> {
        let node = self
            .inner
            .active
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node::from_rc)?;
        node.is_connected().then_some(node)
    }

    // ── Counters ─────────────────────────────────────────────────────

    #[must_use]
    pub fn counters(&self) -> &MutationCounters {
        &self.inner.counters
    }

    /// Shorthand for `counters().snapshot()`.
    #[must_use]
    pub fn mutations(&self) -> MutationSnapshot {
        self.inner.counters.snapshot()
    }
}

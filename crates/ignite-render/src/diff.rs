#![forbid(unsafe_code)]

//! Diff/patch engine.
//!
//! # Algorithm
//! 1. Normalize the view into `next`.
//! 2. Replace mode, no previous tree, or an empty host: rebuild the host's
//!    children from `next`.
//! 3. Otherwise patch the host's children level by level. A level is
//!    patchable when it is append-only, not reordered, and kinds and tags
//!    line up by index. A level that is not patchable has its children
//!    rebuilt, and the reason is reported.
//!
//! The live DOM is read, never trusted: text and props are compared
//! against what the element currently holds, and a missing or wrong-kind
//! live node is rebuilt in place.

use ignite_core::PatchMode;
use ignite_dom::{Document, Node, NodeType};
use smallvec::SmallVec;

use crate::denylist::NoDiffRegistry;
use crate::fallback::{Fallback, FallbackReason};
use crate::normalize::normalize;
use crate::props::Props;
use crate::reconcile::patch_props;
use crate::renderable::Renderable;
use crate::vnode::{ElementNode, VNode};

type Fingerprints = SmallVec<[u64; 16]>;

/// Options for one [`render`] call.
#[derive(Clone, Copy)]
pub struct PatchOptions<'a> {
    pub mode: PatchMode,
    /// Tags that are always replaced. `None` disables the denylist.
    pub denylist: Option<&'a NoDiffRegistry>,
    /// Invoked for every structural fallback.
    pub on_fallback: Option<&'a dyn Fn(&Fallback)>,
}

impl Default for PatchOptions<'_> {
    fn default() -> Self {
        Self {
            mode: PatchMode::Diff,
            denylist: None,
            on_fallback: None,
        }
    }
}

impl std::fmt::Debug for PatchOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchOptions")
            .field("mode", &self.mode)
            .field("denylist", &self.denylist.map(NoDiffRegistry::tags))
            .field("on_fallback", &self.on_fallback.is_some())
            .finish()
    }
}

impl<'a> PatchOptions<'a> {
    #[must_use]
    pub fn with_mode(mut self, mode: PatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_denylist(mut self, denylist: &'a NoDiffRegistry) -> Self {
        self.denylist = Some(denylist);
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, on_fallback: &'a dyn Fn(&Fallback)) -> Self {
        self.on_fallback = Some(on_fallback);
        self
    }

    fn report(&self, fallback: Fallback) {
        if let Some(hook) = self.on_fallback {
            hook(&fallback);
        }
    }

    fn denied(&self, tag: &str) -> bool {
        self.denylist.is_some_and(|d| d.contains(tag))
    }
}

/// Clear `host` and build `view` from scratch. Returns the normalized tree.
pub fn mount(host: &Node, view: &Renderable) -> Vec<VNode> {
    let next = normalize(view, None);
    let _span = tracing::debug_span!("ignite.mount", nodes = next.len()).entered();
    match host.owner_document() {
        Some(doc) => rebuild_children(&doc, host, &next),
        None => tracing::warn!("mount skipped: host document is gone"),
    }
    next
}

/// Reconcile `host` toward `view`, patching against `previous` where safe.
///
/// Always returns the normalized `view`, which becomes `previous` for the
/// next call.
pub fn render(
    host: &Node,
    view: &Renderable,
    previous: Option<&[VNode]>,
    options: &PatchOptions<'_>,
) -> Vec<VNode> {
    let next = normalize(view, None);
    let _span = tracing::debug_span!(
        "ignite.render",
        mode = options.mode.as_str(),
        nodes = next.len()
    )
    .entered();
    let Some(doc) = host.owner_document() else {
        tracing::warn!("render skipped: host document is gone");
        return next;
    };

    match previous {
        Some(previous) if options.mode == PatchMode::Diff && host.child_count() > 0 => {
            let patcher = Patcher { doc, options };
            if let Err(reason) = patcher.patch_children(host, previous, &next) {
                options.report(Fallback::host(reason));
                rebuild_children(&patcher.doc, host, &next);
            }
        }
        _ => rebuild_children(&doc, host, &next),
    }
    next
}

/// Check whether `next` can be patched over `previous` at one level.
///
/// # Errors
/// Returns the first reason the level must be replaced instead.
pub fn check_level(previous: &[VNode], next: &[VNode]) -> Result<(), FallbackReason> {
    if next.len() < previous.len() {
        return Err(FallbackReason::ChildRemoved);
    }
    let old: Fingerprints = previous.iter().map(VNode::fingerprint).collect();
    let new: Fingerprints = next[..previous.len()].iter().map(VNode::fingerprint).collect();
    if old != new && is_permutation(&old, &new) {
        return Err(FallbackReason::ChildOrderChange);
    }
    for (before, after) in previous.iter().zip(next) {
        match (before, after) {
            (VNode::Element(a), VNode::Element(b)) => {
                if a.tag != b.tag || a.namespace != b.namespace {
                    return Err(FallbackReason::TagMismatch);
                }
            }
            (a, b) if a.kind() != b.kind() => return Err(FallbackReason::NodeKindMismatch),
            _ => {}
        }
    }
    Ok(())
}

fn is_permutation(a: &[u64], b: &[u64]) -> bool {
    let mut a: Fingerprints = a.iter().copied().collect();
    let mut b: Fingerprints = b.iter().copied().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

struct Patcher<'a> {
    doc: Document,
    options: &'a PatchOptions<'a>,
}

impl Patcher<'_> {
    fn patch_children(&self, parent: &Node, previous: &[VNode], next: &[VNode]) -> Result<(), FallbackReason> {
        check_level(previous, next)?;
        let live = parent.child_nodes();
        for (index, node) in next.iter().enumerate() {
            match (previous.get(index), live.get(index)) {
                (Some(before), Some(live_node)) => self.patch_node(parent, live_node, before, node),
                (Some(_), None) => {
                    tracing::debug!(index, "live node missing; appending");
                    parent.append_child(&build(&self.doc, node));
                }
                (None, _) => parent.append_child(&build(&self.doc, node)),
            }
        }
        Ok(())
    }

    fn patch_node(&self, parent: &Node, live: &Node, before: &VNode, after: &VNode) {
        match after {
            VNode::Text { value } => {
                if live.node_type() != NodeType::Text {
                    self.replace(parent, live, after);
                } else if live.data().as_deref() != Some(value.as_str()) {
                    live.set_data(value);
                }
            }
            VNode::Comment { .. } => {
                if live.node_type() != NodeType::Comment {
                    self.replace(parent, live, after);
                }
            }
            VNode::Element(element) => self.patch_element(parent, live, before, element, after),
        }
    }

    fn patch_element(&self, parent: &Node, live: &Node, before: &VNode, element: &ElementNode, after: &VNode) {
        let live_matches = live.tag_name().as_deref() == Some(element.tag.as_str())
            && live.namespace() == Some(element.dom_namespace());
        if !live_matches {
            self.options.report(Fallback::at(FallbackReason::TagMismatch, &element.tag));
            self.replace(parent, live, after);
            return;
        }
        if self.options.denied(&element.tag) {
            self.options.report(Fallback::at(FallbackReason::DenylistTag, &element.tag));
            self.replace(parent, live, after);
            return;
        }

        let empty = Props::new();
        let (old_props, old_children) = match before {
            VNode::Element(prev) => (&prev.props, prev.children.as_slice()),
            _ => (&empty, &[][..]),
        };
        patch_props(live, old_props, &element.props);

        // An element with no live children has nothing to patch against.
        if live.child_count() == 0 && !old_children.is_empty() {
            rebuild_children(&self.doc, live, &element.children);
            return;
        }
        if let Err(reason) = self.patch_children(live, old_children, &element.children) {
            self.options.report(Fallback::at(reason, &element.tag));
            rebuild_children(&self.doc, live, &element.children);
        }
    }

    fn replace(&self, parent: &Node, live: &Node, node: &VNode) {
        let fresh = build(&self.doc, node);
        if !parent.replace_child(&fresh, live) {
            parent.append_child(&fresh);
        }
    }
}

/// Replace every child of `parent` with freshly built `nodes`.
fn rebuild_children(doc: &Document, parent: &Node, nodes: &[VNode]) {
    let built: Vec<Node> = nodes.iter().map(|node| build(doc, node)).collect();
    parent.replace_children(&built);
}

/// Build a detached live subtree for `node`.
#[must_use]
pub fn build(doc: &Document, node: &VNode) -> Node {
    match node {
        VNode::Text { value } => doc.create_text_node(value),
        VNode::Comment { label } => doc.create_comment(label.as_deref().unwrap_or_default()),
        VNode::Element(element) => {
            let live = doc.create_element_ns(&element.tag, element.dom_namespace());
            patch_props(&live, &Props::new(), &element.props);
            for child in &element.children {
                live.append_child(&build(doc, child));
            }
            live
        }
    }
}

#![forbid(unsafe_code)]

//! Render strategies: the attach/render/detach contract a component drives.
//!
//! A strategy owns a content root inside its host's shadow root and, for the
//! diffing strategy, the previous normalized tree.
//!
//! ```text
//! Detached --attach--> Attached --render*--> Attached --detach--> Detached
//! ```

use std::sync::Arc;

use bitflags::bitflags;
use ignite_core::{IgniteConfig, PatchMode, RendererKind, StyleSource};
use ignite_dom::Node;

use crate::denylist::NoDiffRegistry;
use crate::diff::{self, PatchOptions};
use crate::fallback::{Fallback, FallbackReason, FallbackReporter};
use crate::renderable::Renderable;
use crate::vnode::VNode;

/// Marker attribute on the managed content root.
pub const ROOT_MARKER: &str = "data-ignite-root";
/// Marker attribute on injected global style elements.
pub const STYLE_MARKER: &str = "data-ignite-style";
/// Host attribute: content was server-rendered or hydrated externally.
pub const HYDRATED_ATTR: &str = "data-ignite-hydrated";
/// Host attribute: opt this instance out of diffing.
pub const NO_DIFF_ATTR: &str = "data-ignite-no-diff";

/// Usage errors raised by strategies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("render invoked before attach")]
    NotAttached,
}

bitflags! {
    /// Host conditions that force full replacement for an instance's lifetime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ForceReplace: u8 {
        const DENYLISTED = 0b001;
        const HYDRATED   = 0b010;
        const OPTED_OUT  = 0b100;
    }
}

impl ForceReplace {
    /// Read the flags from `host`.
    #[must_use]
    pub fn from_host(host: &Node, denylist: &NoDiffRegistry) -> Self {
        let mut flags = Self::empty();
        if host.tag_name().is_some_and(|tag| denylist.contains(&tag)) {
            flags |= Self::DENYLISTED;
        }
        if host.has_attribute(HYDRATED_ATTR) {
            flags |= Self::HYDRATED;
        }
        if host.has_attribute(NO_DIFF_ATTR) {
            flags |= Self::OPTED_OUT;
        }
        flags
    }

    /// Reason reported for the highest-priority flag.
    #[must_use]
    pub fn reason(self) -> Option<FallbackReason> {
        if self.contains(Self::DENYLISTED) {
            Some(FallbackReason::DenylistTag)
        } else if self.contains(Self::HYDRATED) {
            Some(FallbackReason::HydratedHost)
        } else if self.contains(Self::OPTED_OUT) {
            Some(FallbackReason::OptedOutHost)
        } else {
            None
        }
    }
}

/// The attach/render/detach contract.
pub trait RenderStrategy {
    /// Renderer name as used in configuration.
    fn name(&self) -> &'static str;

    /// Create or reuse the content root under `host`. Idempotent.
    fn attach(&mut self, host: &Node);

    /// Render `view` into the content root.
    ///
    /// # Errors
    /// [`RenderError::NotAttached`] when called before [`attach`](Self::attach).
    fn render(&mut self, view: &Renderable) -> Result<(), RenderError>;

    /// Remove the content root and drop cached state.
    fn detach(&mut self);

    /// The managed content root, while attached.
    fn content_root(&self) -> Option<&Node>;

    fn is_attached(&self) -> bool {
        self.content_root().is_some()
    }
}

/// Build the strategy selected by `config.renderer`.
#[must_use]
pub fn create_strategy(config: &IgniteConfig) -> Box<dyn RenderStrategy> {
    match config.renderer {
        RendererKind::IgniteJsx => Box::new(DiffStrategy::new(config.clone())),
        RendererKind::Lit => Box::new(TemplateStrategy::new(config.clone())),
    }
}

// ── Content root ─────────────────────────────────────────────────────────

fn attach_root(host: &Node, styles: &[&StyleSource]) -> Node {
    let shadow = host.attach_shadow();
    if let Some(existing) = shadow
        .child_nodes()
        .into_iter()
        .find(|node| node.has_attribute(ROOT_MARKER))
    {
        tracing::debug!("reusing existing content root");
        return existing;
    }
    let doc = host.owner_document().unwrap_or_default();
    let already_styled = shadow
        .child_nodes()
        .iter()
        .any(|node| node.has_attribute(STYLE_MARKER));
    if !already_styled {
        for source in styles {
            let style = match source {
                StyleSource::Inline(css) => {
                    let el = doc.create_element("style");
                    el.append_child(&doc.create_text_node(css));
                    el
                }
                StyleSource::Href(href) => {
                    let el = doc.create_element("link");
                    el.set_attribute("rel", "stylesheet");
                    el.set_attribute("href", href.trim());
                    el
                }
            };
            style.set_attribute(STYLE_MARKER, "");
            shadow.append_child(&style);
        }
    }
    let root = doc.create_element("div");
    root.set_attribute(ROOT_MARKER, "");
    shadow.append_child(&root);
    root
}

// ── Diffing strategy ─────────────────────────────────────────────────────

/// The `ignite-jsx` strategy: normalizes and patches incrementally.
#[derive(Debug)]
pub struct DiffStrategy {
    config: IgniteConfig,
    denylist: Arc<NoDiffRegistry>,
    reporter: FallbackReporter,
    root: Option<Node>,
    previous: Option<Vec<VNode>>,
    flags: ForceReplace,
}

impl DiffStrategy {
    /// Strategy using the process-wide denylist.
    #[must_use]
    pub fn new(config: IgniteConfig) -> Self {
        let reporter = FallbackReporter::new(config.log_level);
        Self {
            config,
            denylist: NoDiffRegistry::global(),
            reporter,
            root: None,
            previous: None,
            flags: ForceReplace::empty(),
        }
    }

    #[must_use]
    pub fn with_denylist(mut self, denylist: Arc<NoDiffRegistry>) -> Self {
        self.denylist = denylist;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: FallbackReporter) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn flags(&self) -> ForceReplace {
        self.flags
    }

    /// Last normalized tree, if any render happened since attach.
    #[must_use]
    pub fn previous(&self) -> Option<&[VNode]> {
        self.previous.as_deref()
    }

    /// Effective patch mode and, when replacement is forced, why.
    #[must_use]
    pub fn effective_mode(&self) -> (PatchMode, Option<FallbackReason>) {
        let forced = self.flags.reason().or_else(|| {
            if !self.config.diffing_enabled {
                Some(FallbackReason::DiffDisabled)
            } else if self.config.patch_mode == PatchMode::Replace {
                Some(FallbackReason::ConfigReplace)
            } else {
                None
            }
        });
        match forced {
            Some(reason) => (PatchMode::Replace, Some(reason)),
            None => (PatchMode::Diff, None),
        }
    }
}

impl RenderStrategy for DiffStrategy {
    fn name(&self) -> &'static str {
        RendererKind::IgniteJsx.as_str()
    }

    fn attach(&mut self, host: &Node) {
        if self.root.is_some() {
            return;
        }
        let styles = self.config.valid_global_styles();
        self.root = Some(attach_root(host, &styles));
        self.flags = ForceReplace::from_host(host, &self.denylist);
        self.previous = None;
        tracing::debug!(flags = ?self.flags, "diff strategy attached");
    }

    fn render(&mut self, view: &Renderable) -> Result<(), RenderError> {
        let root = self.root.as_ref().ok_or(RenderError::NotAttached)?;
        let next = match self.previous.take() {
            None => diff::mount(root, view),
            Some(previous) => {
                let (mode, forced) = self.effective_mode();
                if let Some(reason) = forced {
                    self.reporter.report(&Fallback::host(reason));
                }
                let reporter = &self.reporter;
                let hook = |fallback: &Fallback| reporter.report(fallback);
                let options = PatchOptions::default()
                    .with_mode(mode)
                    .with_denylist(&self.denylist)
                    .with_fallback(&hook);
                diff::render(root, view, Some(previous.as_slice()), &options)
            }
        };
        self.previous = Some(next);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(root) = self.root.take() {
            root.remove();
        }
        self.previous = None;
        self.flags = ForceReplace::empty();
    }

    fn content_root(&self) -> Option<&Node> {
        self.root.as_ref()
    }
}

// ── Template strategy ────────────────────────────────────────────────────

/// The `lit` strategy: every render replaces the content root's children.
#[derive(Debug)]
pub struct TemplateStrategy {
    config: IgniteConfig,
    root: Option<Node>,
}

impl TemplateStrategy {
    #[must_use]
    pub fn new(config: IgniteConfig) -> Self {
        Self { config, root: None }
    }
}

impl RenderStrategy for TemplateStrategy {
    fn name(&self) -> &'static str {
        RendererKind::Lit.as_str()
    }

    fn attach(&mut self, host: &Node) {
        if self.root.is_some() {
            return;
        }
        let styles = self.config.valid_global_styles();
        self.root = Some(attach_root(host, &styles));
    }

    fn render(&mut self, view: &Renderable) -> Result<(), RenderError> {
        let root = self.root.as_ref().ok_or(RenderError::NotAttached)?;
        diff::mount(root, view);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(root) = self.root.take() {
            root.remove();
        }
    }

    fn content_root(&self) -> Option<&Node> {
        self.root.as_ref()
    }
}

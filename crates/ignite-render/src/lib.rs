#![forbid(unsafe_code)]

//! Render kernel: virtual nodes, normalization, property reconciliation, and
//! the conservative diff/patch engine.
//!
//! # Role in Ignite
//! A component's view returns a [`Renderable`]. The active
//! [`RenderStrategy`] hands it to this crate, which normalizes it into a flat
//! list of [`VNode`]s and either patches the live DOM in place or replaces
//! the affected level wholesale.
//!
//! # Patch policy
//! Child lists are patched append-only and by index. Anything the engine
//! cannot prove safe (removed children, reordered children, kind or tag
//! changes, denylisted tags) falls back to replacing the children of the
//! level that failed, and reports a [`FallbackReason`].
//!
//! # Invariants
//! 1. Normalization never produces holes: every non-empty renderable input
//!    yields at least one node, and empty lists or fragments yield none.
//! 2. Rendering the same view twice against its own previous tree performs
//!    no DOM mutation.
//! 3. `render` always returns the freshly normalized tree, even on fallback.

pub mod denylist;
pub mod diff;
pub mod fallback;
pub mod normalize;
pub mod props;
pub mod reconcile;
pub mod renderable;
pub mod strategy;
pub mod vnode;

pub use denylist::NoDiffRegistry;
pub use diff::{PatchOptions, mount, render};
pub use fallback::{Fallback, FallbackReason, FallbackReporter};
pub use normalize::normalize;
pub use props::{PropValue, Props, StyleValue};
pub use reconcile::patch_props;
pub use renderable::{Component, Descriptor, ElementType, Renderable, h};
pub use strategy::{
    DiffStrategy, ForceReplace, RenderError, RenderStrategy, TemplateStrategy, create_strategy,
};
pub use vnode::{ElementNode, VNode, VNodeKind};

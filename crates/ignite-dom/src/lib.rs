#![forbid(unsafe_code)]

//! Host-driven live DOM for Ignite.
//!
//! This crate is the platform the reconciliation engine mutates. It models the
//! parts of the browser DOM the engine relies on and nothing more:
//!
//! - [`Document`]: node factory, focus tracking, and [`MutationCounters`].
//! - [`Node`]: shared handle to an element, text, comment, or shadow root.
//! - Element state: attributes, DOM properties (with `value`/`checked` as
//!   first-class slots), a [`StyleDeclaration`], event listeners, and IME
//!   composition state.
//! - [`properties`]: the precomputed classification of which names are
//!   writable DOM properties per tag.
//!
//! # Architecture
//!
//! `Node` wraps `Rc<RefCell<..>>`. Children are owned strongly by their parent,
//! parents and shadow hosts are referenced weakly. Everything is
//! single-threaded; listeners run synchronously during [`Node::dispatch_event`].
//!
//! # Invariants
//!
//! 1. A node has at most one parent; inserting it elsewhere detaches it first.
//! 2. Every observable mutation bumps exactly one counter in the owning
//!    document's [`MutationCounters`].
//! 3. Listeners are invoked in registration order; the same listener (by
//!    identity) is registered at most once per event type.

pub mod counters;
pub mod document;
pub mod element;
pub mod event;
pub mod node;
pub mod properties;
pub mod serialize;
pub mod style;

pub use counters::{MutationCounters, MutationSnapshot};
pub use document::Document;
pub use element::DomValue;
pub use event::{Event, EventListener};
pub use node::{Namespace, Node, NodeType};
pub use serialize::{inner_html, outer_html};
pub use style::StyleDeclaration;

#![forbid(unsafe_code)]

//! Ignite public facade crate.
//!
//! Bind a state store to a custom element and let the diff engine keep its
//! shadow DOM in sync:
//!
//! ```
//! use std::rc::Rc;
//!
//! use ignite::prelude::*;
//!
//! let store = Rc::new(ReducerStore::new(0_i64, |n: &i64, by: &i64| n + by));
//! let registry = ElementRegistry::new();
//! registry
//!     .define(
//!         "x-counter",
//!         ComponentDefinition::new(
//!             StoreSource::store(Rc::clone(&store)),
//!             |args: &RenderArgs<i64, i64>| Renderable::from(h("output").child(args.state)),
//!         )
//!         .with_config(IgniteConfig::default()),
//!     )
//!     .unwrap();
//!
//! let doc = Document::new();
//! let counter = registry.create("x-counter", &doc).unwrap();
//! counter.connect().unwrap();
//! store.dispatch(2);
//! assert_eq!(counter.host().shadow_root().unwrap().text_content(), "2");
//! ```

pub use ignite_core as core;
pub use ignite_dom as dom;
pub use ignite_render as render;
#[cfg(feature = "runtime")]
pub use ignite_runtime as runtime;

pub mod prelude {
    pub use ignite_core::{IgniteConfig, LogLevel, PatchMode, RendererKind, StyleSource};
    pub use ignite_dom::{Document, Node};
    pub use ignite_render::{
        Fallback, FallbackReason, NoDiffRegistry, PropValue, RenderStrategy, Renderable,
        StyleValue, h,
    };

    #[cfg(feature = "runtime")]
    pub use ignite_runtime::{
        Adapter, Command, Component, ComponentDefinition, ElementHandle, ElementRegistry,
        IgniteError, MachineDefinition, MachineEvent, ObservableStore, ReducerStore, RenderArgs,
        Scope, StateNode, StoreSource, Transition, View,
    };
}

#![forbid(unsafe_code)]

//! Runtime: state adapters, scoping, and the component lifecycle.
//!
//! # Role in Ignite
//! A [`StoreSource`] describes which store a component renders from. It is
//! resolved once into an [`AdapterFactory`] whose [`Scope`] decides whether
//! every component gets its own adapter or all of them share one
//! reference-counted instance. A [`Component`] subscribes to its adapter on
//! connect and drives its render strategy on every state change.
//!
//! # Threading
//! Everything here is single-threaded (`Rc`, `RefCell`). Notifications run
//! synchronously in subscriber registration order.

pub mod adapter;
pub mod component;
pub mod definition;
pub mod error;
pub mod machine;
pub mod observable;
pub mod observable_store;
pub mod reducer;
pub mod registry;
pub mod scope;
pub mod source;

pub use adapter::{Adapter, AdapterError, DynAdapter, Scope, StateListener, StopFlag};
pub use component::{Component, Lifecycle};
pub use definition::{
    CommandFn, CommandTable, ComponentDefinition, FacadeError, RenderArgs, Sender, View,
};
pub use error::{IgniteError, Result};
pub use machine::{
    MachineActor, MachineAdapter, MachineDefinition, MachineEvent, MachineSnapshot, StateNode,
    Transition,
};
pub use observable::{Observable, Subscription};
pub use observable_store::{Command, ObservableAdapter, ObservableStore};
pub use reducer::{ReducerAdapter, ReducerStore, SliceAdapter};
pub use registry::{ElementHandle, ElementRegistry, RegistryError, validate_tag_name};
pub use scope::AdapterFactory;
pub use source::{SourceKind, StoreSource};

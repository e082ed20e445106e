#![forbid(unsafe_code)]

//! Store shapes a component can be bound to, resolved once into a factory.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::adapter::{DynAdapter, Scope};
use crate::machine::{MachineActor, MachineAdapter, MachineDefinition, MachineEvent, MachineSnapshot};
use crate::observable_store::{Command, ObservableAdapter, ObservableStore};
use crate::reducer::{ReducerAdapter, ReducerStore, SliceAdapter};
use crate::scope::AdapterFactory;

/// Which store shape a factory was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Machine,
    Actor,
    Store,
    StoreCreator,
    Slice,
    Observable,
    ObservableCreator,
    Custom,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Machine => "machine",
            Self::Actor => "actor",
            Self::Store => "store",
            Self::StoreCreator => "store-creator",
            Self::Slice => "slice",
            Self::Observable => "observable",
            Self::ObservableCreator => "observable-creator",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Creator<S, E> = Rc<dyn Fn() -> DynAdapter<S, E>>;

/// A store a component can render from.
///
/// Existing instances resolve to Shared factories. Definitions and creator
/// functions resolve to Isolated ones.
pub enum StoreSource<S, E> {
    Shared { kind: SourceKind, create: Creator<S, E> },
    Isolated { kind: SourceKind, create: Creator<S, E> },
}

impl<S, E> fmt::Debug for StoreSource<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSource")
            .field("scope", &self.scope())
            .field("kind", &self.kind())
            .finish()
    }
}

impl<S, E> StoreSource<S, E> {
    pub fn scope(&self) -> Scope {
        match self {
            Self::Shared { .. } => Scope::Shared,
            Self::Isolated { .. } => Scope::Isolated,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Shared { kind, .. } | Self::Isolated { kind, .. } => *kind,
        }
    }
}

impl<S: Clone + 'static, E: 'static> StoreSource<S, E> {
    pub fn resolve(self) -> AdapterFactory<S, E> {
        let (scope, kind, create) = match self {
            Self::Shared { kind, create } => (Scope::Shared, kind, create),
            Self::Isolated { kind, create } => (Scope::Isolated, kind, create),
        };
        AdapterFactory::with_kind(scope, kind, move || create())
    }
}

impl<S: Clone + 'static, E: 'static> From<StoreSource<S, E>> for AdapterFactory<S, E> {
    fn from(source: StoreSource<S, E>) -> Self {
        source.resolve()
    }
}

impl<C: Clone + PartialEq + 'static> StoreSource<MachineSnapshot<C>, MachineEvent> {
    /// A fresh actor per component.
    pub fn machine(definition: MachineDefinition<C>) -> Self {
        let definition = Rc::new(definition);
        Self::Isolated {
            kind: SourceKind::Machine,
            create: Rc::new(move || Rc::new(MachineAdapter::spawn(Rc::clone(&definition))) as DynAdapter<_, _>),
        }
    }

    /// A running actor shared by every component.
    pub fn actor(actor: Rc<MachineActor<C>>) -> Self {
        Self::Shared {
            kind: SourceKind::Actor,
            create: Rc::new(move || Rc::new(MachineAdapter::wrap(Rc::clone(&actor))) as DynAdapter<_, _>),
        }
    }
}

impl<S: Clone + PartialEq + 'static, A: 'static> StoreSource<S, A> {
    /// An existing reducer store shared by every component.
    pub fn store(store: Rc<ReducerStore<S, A>>) -> Self {
        Self::Shared {
            kind: SourceKind::Store,
            create: Rc::new(move || {
                Rc::new(ReducerAdapter::new(Rc::clone(&store), Scope::Shared)) as DynAdapter<S, A>
            }),
        }
    }

    /// A reducer store built per component.
    pub fn store_creator(create: impl Fn() -> ReducerStore<S, A> + 'static) -> Self {
        Self::Isolated {
            kind: SourceKind::StoreCreator,
            create: Rc::new(move || {
                Rc::new(ReducerAdapter::new(Rc::new(create()), Scope::Isolated)) as DynAdapter<S, A>
            }),
        }
    }

    /// A selected slice of a shared reducer store.
    pub fn slice<R>(store: Rc<ReducerStore<R, A>>, select: impl Fn(&R) -> S + 'static) -> Self
    where
        R: Clone + PartialEq + 'static,
    {
        let select = Rc::new(select);
        Self::Shared {
            kind: SourceKind::Slice,
            create: Rc::new(move || {
                let select = Rc::clone(&select);
                Rc::new(SliceAdapter::new(Rc::clone(&store), move |state: &R| select(state)))
                    as DynAdapter<S, A>
            }),
        }
    }
}

impl<S: Clone + PartialEq + 'static> StoreSource<S, Command> {
    /// An existing observable store shared by every component.
    pub fn observable(store: Rc<ObservableStore<S>>) -> Self {
        Self::Shared {
            kind: SourceKind::Observable,
            create: Rc::new(move || {
                Rc::new(ObservableAdapter::new(Rc::clone(&store), Scope::Shared))
                    as DynAdapter<S, Command>
            }),
        }
    }

    /// An observable store built per component.
    pub fn observable_creator(create: impl Fn() -> ObservableStore<S> + 'static) -> Self {
        Self::Isolated {
            kind: SourceKind::ObservableCreator,
            create: Rc::new(move || {
                Rc::new(ObservableAdapter::new(Rc::new(create()), Scope::Isolated))
                    as DynAdapter<S, Command>
            }),
        }
    }
}

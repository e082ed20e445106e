#![forbid(unsafe_code)]

//! Adapter factories and shared-adapter reference counting.
//!
//! # Invariants
//!
//! 1. An Isolated factory creates one adapter per [`AdapterFactory::create`].
//! 2. A Shared factory holds at most one live adapter. It is created on the
//!    first acquire and stopped (when managed) on the release that brings the
//!    count back to zero.
//! 3. Acquiring after a managed stop creates a fresh adapter.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::adapter::{DynAdapter, Scope};
use crate::source::SourceKind;

type Create<S, E> = Rc<dyn Fn() -> DynAdapter<S, E>>;

struct SharedSlot<S, E> {
    adapter: Option<DynAdapter<S, E>>,
    refs: usize,
}

struct FactoryInner<S, E> {
    scope: Scope,
    kind: SourceKind,
    create: Create<S, E>,
    created: Cell<usize>,
    shared: RefCell<SharedSlot<S, E>>,
}

/// Resolved adapter constructor with a declared [`Scope`].
///
/// Cloning yields a handle to the same factory, and so the same shared slot.
pub struct AdapterFactory<S, E> {
    inner: Rc<FactoryInner<S, E>>,
}

impl<S, E> Clone for AdapterFactory<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E> fmt::Debug for AdapterFactory<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.shared.borrow();
        f.debug_struct("AdapterFactory")
            .field("scope", &self.inner.scope)
            .field("kind", &self.inner.kind)
            .field("created", &self.inner.created.get())
            .field("shared_refs", &shared.refs)
            .field("shared_live", &shared.adapter.is_some())
            .finish()
    }
}

impl<S: Clone + 'static, E: 'static> AdapterFactory<S, E> {
    /// Factory for a custom adapter type.
    pub fn new(scope: Scope, create: impl Fn() -> DynAdapter<S, E> + 'static) -> Self {
        Self::with_kind(scope, SourceKind::Custom, create)
    }

    pub(crate) fn with_kind(
        scope: Scope,
        kind: SourceKind,
        create: impl Fn() -> DynAdapter<S, E> + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(FactoryInner {
                scope,
                kind,
                create: Rc::new(create),
                created: Cell::new(0),
                shared: RefCell::new(SharedSlot {
                    adapter: None,
                    refs: 0,
                }),
            }),
        }
    }

    pub fn scope(&self) -> Scope {
        self.inner.scope
    }

    pub fn kind(&self) -> SourceKind {
        self.inner.kind
    }

    /// How many times the underlying constructor ran.
    pub fn instances_created(&self) -> usize {
        self.inner.created.get()
    }

    /// Connected components currently holding the shared adapter.
    pub fn shared_refs(&self) -> usize {
        self.inner.shared.borrow().refs
    }

    /// Run the constructor.
    pub fn create(&self) -> DynAdapter<S, E> {
        self.inner.created.set(self.inner.created.get() + 1);
        tracing::debug!(
            scope = self.inner.scope.as_str(),
            kind = self.inner.kind.as_str(),
            "adapter created"
        );
        (self.inner.create)()
    }

    /// Take a reference on the shared adapter, creating it if absent or
    /// stopped.
    pub fn acquire(&self) -> DynAdapter<S, E> {
        let existing = {
            let slot = self.inner.shared.borrow();
            slot.adapter
                .as_ref()
                .filter(|adapter| !adapter.is_stopped())
                .map(Rc::clone)
        };
        let adapter = match existing {
            Some(adapter) => adapter,
            None => {
                let fresh = self.create();
                let mut slot = self.inner.shared.borrow_mut();
                slot.adapter = Some(Rc::clone(&fresh));
                fresh
            }
        };
        let mut slot = self.inner.shared.borrow_mut();
        slot.refs += 1;
        tracing::debug!(refs = slot.refs, "shared adapter acquired");
        adapter
    }

    /// Drop a reference on the shared adapter. The last release stops it when
    /// `manage_lifecycle` is set.
    pub fn release(&self, manage_lifecycle: bool) {
        let to_stop = {
            let mut slot = self.inner.shared.borrow_mut();
            if slot.refs == 0 {
                tracing::warn!("shared adapter released more often than acquired");
                return;
            }
            slot.refs -= 1;
            tracing::debug!(refs = slot.refs, "shared adapter released");
            if slot.refs == 0 && manage_lifecycle {
                slot.adapter.take()
            } else {
                None
            }
        };
        if let Some(adapter) = to_stop {
            tracing::debug!(kind = self.inner.kind.as_str(), "stopping shared adapter");
            adapter.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{ReducerAdapter, ReducerStore};

    fn factory(scope: Scope) -> AdapterFactory<i32, i32> {
        let store = Rc::new(ReducerStore::new(0, |s: &i32, a: &i32| s + a));
        AdapterFactory::new(scope, move || {
            Rc::new(ReducerAdapter::new(Rc::clone(&store), scope)) as DynAdapter<i32, i32>
        })
    }

    #[test]
    fn shared_slot_counts_references() {
        let f = factory(Scope::Shared);
        let a = f.acquire();
        let b = f.acquire();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(f.shared_refs(), 2);
        f.release(true);
        assert!(!a.is_stopped());
        f.release(true);
        assert!(a.is_stopped());
        assert_eq!(f.instances_created(), 1);
    }

    #[test]
    fn acquire_after_stop_recreates() {
        let f = factory(Scope::Shared);
        let first = f.acquire();
        f.release(true);
        let second = f.acquire();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(f.instances_created(), 2);
    }

    #[test]
    fn unmanaged_release_keeps_adapter() {
        let f = factory(Scope::Shared);
        let first = f.acquire();
        f.release(false);
        assert!(!first.is_stopped());
        let again = f.acquire();
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(f.instances_created(), 1);
    }

    #[test]
    fn unbalanced_release_is_ignored() {
        let f = factory(Scope::Shared);
        f.release(true);
        assert_eq!(f.shared_refs(), 0);
    }
}

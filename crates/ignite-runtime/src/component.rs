#![forbid(unsafe_code)]

//! Component instance lifecycle: `Constructed -> Connected <-> Disconnected`.
//!
//! # Invariants
//!
//! 1. While connected, the component holds exactly one adapter subscription.
//! 2. Connect and disconnect are idempotent.
//! 3. A Shared adapter reference is taken on connect and released on
//!    disconnect, never more.
//! 4. Renders never nest. A notification that arrives mid-render marks the
//!    component dirty, and one follow-up render runs when the current render
//!    returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ignite_dom::Node;
use ignite_render::RenderStrategy;

use crate::adapter::{DynAdapter, Scope};
use crate::definition::ComponentDefinition;
use crate::error::Result;
use crate::observable::Subscription;

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Constructed,
    Connected,
    Disconnected,
}

impl Lifecycle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

struct ComponentInner<S, E> {
    host: Node,
    definition: ComponentDefinition<S, E>,
    strategy: RefCell<Box<dyn RenderStrategy>>,
    adapter: RefCell<Option<DynAdapter<S, E>>>,
    subscription: RefCell<Option<Subscription>>,
    lifecycle: Cell<Lifecycle>,
    rendering: Cell<bool>,
    dirty: Cell<bool>,
    renders: Cell<u64>,
}

/// One live instance of a [`ComponentDefinition`] bound to a host element.
///
/// Cloning yields another handle to the same instance.
pub struct Component<S, E> {
    inner: Rc<ComponentInner<S, E>>,
}

impl<S, E> Clone for Component<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E> fmt::Debug for Component<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("lifecycle", &self.inner.lifecycle.get())
            .field("renders", &self.inner.renders.get())
            .field("has_adapter", &self.inner.adapter.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl<S: Clone + 'static, E: 'static> Component<S, E> {
    /// Bind `definition` to `host`. Isolated factories create their adapter
    /// here; Shared ones wait for the first connect.
    pub fn new(definition: ComponentDefinition<S, E>, host: Node) -> Self {
        let strategy = definition.build_strategy();
        let adapter = match definition.factory().scope() {
            Scope::Isolated => Some(definition.factory().create()),
            Scope::Shared => None,
        };
        Self {
            inner: Rc::new(ComponentInner {
                host,
                definition,
                strategy: RefCell::new(strategy),
                adapter: RefCell::new(adapter),
                subscription: RefCell::new(None),
                lifecycle: Cell::new(Lifecycle::Constructed),
                rendering: Cell::new(false),
                dirty: Cell::new(false),
                renders: Cell::new(0),
            }),
        }
    }

    pub fn host(&self) -> &Node {
        &self.inner.host
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle.get()
    }

    pub fn is_connected(&self) -> bool {
        self.lifecycle() == Lifecycle::Connected
    }

    /// Completed render passes.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// The adapter currently bound, if any.
    pub fn adapter(&self) -> Option<DynAdapter<S, E>> {
        self.inner.adapter.borrow().clone()
    }

    pub fn state(&self) -> Option<S> {
        self.adapter().map(|adapter| adapter.get_state())
    }

    /// Attach, subscribe and render from the current state.
    ///
    /// # Errors
    /// Propagates a failed subscribe, render or facade callback. On error the
    /// component is left disconnected.
    pub fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        let _span = tracing::debug_span!("ignite.connect", tag = ?self.inner.host.tag_name()).entered();
        let adapter = self.inner.acquire_adapter();
        self.inner.strategy.borrow_mut().attach(&self.inner.host);

        let weak: Weak<ComponentInner<S, E>> = Rc::downgrade(&self.inner);
        let subscribed = adapter.subscribe(Box::new(move |_state: &S| {
            if let Some(inner) = weak.upgrade() {
                inner.on_state_change();
            }
        }));
        let subscription = match subscribed {
            Ok(subscription) => subscription,
            Err(err) => {
                self.inner.release_adapter();
                self.inner.strategy.borrow_mut().detach();
                return Err(err.into());
            }
        };
        *self.inner.subscription.borrow_mut() = Some(subscription);
        self.inner.lifecycle.set(Lifecycle::Connected);
        tracing::debug!(scope = adapter.scope().as_str(), "component connected");

        if let Err(err) = self.inner.render() {
            self.disconnect();
            return Err(err);
        }
        Ok(())
    }

    /// Unsubscribe, release the adapter per policy and detach.
    pub fn disconnect(&self) {
        if !self.is_connected() {
            return;
        }
        if let Some(subscription) = self.inner.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        self.inner.release_adapter();
        self.inner.strategy.borrow_mut().detach();
        self.inner.lifecycle.set(Lifecycle::Disconnected);
        tracing::debug!("component disconnected");
    }

    /// Render from the adapter's current state.
    ///
    /// # Errors
    /// Same as the render step of [`connect`](Self::connect).
    pub fn render(&self) -> Result<()> {
        self.inner.render()
    }
}

impl<S: Clone + 'static, E: 'static> ComponentInner<S, E> {
    fn acquire_adapter(&self) -> DynAdapter<S, E> {
        let factory = self.definition.factory();
        let adapter = match factory.scope() {
            Scope::Shared => factory.acquire(),
            Scope::Isolated => {
                let current = self.adapter.borrow().clone();
                match current {
                    Some(adapter) if !adapter.is_stopped() => adapter,
                    _ => factory.create(),
                }
            }
        };
        *self.adapter.borrow_mut() = Some(Rc::clone(&adapter));
        adapter
    }

    fn release_adapter(&self) {
        let manage = self.definition.manage_lifecycle();
        let factory = self.definition.factory();
        match factory.scope() {
            Scope::Shared => {
                factory.release(manage);
                self.adapter.borrow_mut().take();
            }
            Scope::Isolated => {
                if manage && let Some(adapter) = self.adapter.borrow().as_ref() {
                    adapter.stop();
                }
            }
        }
    }

    fn on_state_change(&self) {
        if self.lifecycle.get() != Lifecycle::Connected {
            return;
        }
        if let Err(err) = self.render() {
            tracing::error!(error = %err, "render after state change failed");
        }
    }

    fn render(&self) -> Result<()> {
        if self.lifecycle.get() != Lifecycle::Connected {
            return Ok(());
        }
        if self.rendering.replace(true) {
            self.dirty.set(true);
            tracing::debug!("notification during render coalesced");
            return Ok(());
        }
        let result = loop {
            self.dirty.set(false);
            let pass = self.render_once();
            if pass.is_err() || !self.dirty.get() {
                break pass;
            }
        };
        self.rendering.set(false);
        result
    }

    fn render_once(&self) -> Result<()> {
        let Some(adapter) = self.adapter.borrow().clone() else {
            return Ok(());
        };
        let args = self.definition.render_args(&adapter)?;
        let view = self.definition.view().render(&args);
        self.strategy.borrow_mut().render(&view)?;
        self.renders.set(self.renders.get() + 1);
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! The uniform adapter contract every state engine is exposed through.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::observable::Subscription;

/// Adapter lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// A fresh adapter per component instance.
    Isolated,
    /// One reference-counted adapter reused by every component instance.
    Shared,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Isolated => "isolated",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter usage errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("subscribe called on a stopped adapter")]
    Stopped,
}

/// Listener invoked with each new state snapshot.
pub type StateListener<S> = Box<dyn Fn(&S)>;

/// `subscribe / send / get_state / stop` over a state engine.
///
/// Methods take `&self`: adapters are shared behind `Rc` and use interior
/// mutability.
pub trait Adapter {
    type State: Clone + 'static;
    type Event: 'static;

    fn scope(&self) -> Scope;

    /// Register `listener` for future state changes.
    ///
    /// # Errors
    /// [`AdapterError::Stopped`] after [`stop`](Self::stop).
    fn subscribe(&self, listener: StateListener<Self::State>) -> Result<Subscription, AdapterError>;

    /// Forward an event. After `stop` this logs a warning and does nothing.
    fn send(&self, event: Self::Event);

    fn get_state(&self) -> Self::State;

    /// Stop the adapter. Idempotent.
    fn stop(&self);

    fn is_stopped(&self) -> bool;
}

/// Type-erased shared adapter handle.
pub type DynAdapter<S, E> = Rc<dyn Adapter<State = S, Event = E>>;

/// Shared stop flag used by the engine adapters.
///
/// Listeners registered through an adapter are gated on the flag, so a stop
/// silences them even while the underlying store keeps running.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Rc<Cell<bool>>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Set the flag. Returns `false` when it was already set.
    pub fn set(&self) -> bool {
        !self.0.replace(true)
    }

    /// `Err(Stopped)` once set.
    ///
    /// # Errors
    /// [`AdapterError::Stopped`] when the flag is set.
    pub fn check(&self) -> Result<(), AdapterError> {
        if self.is_set() {
            Err(AdapterError::Stopped)
        } else {
            Ok(())
        }
    }

    /// Whether a `send` may proceed; warns when it may not.
    #[must_use]
    pub fn admit_send(&self, adapter: &'static str) -> bool {
        if self.is_set() {
            tracing::warn!(adapter, "send ignored: adapter is stopped");
            false
        } else {
            true
        }
    }

    /// Wrap `listener` so it goes quiet once the flag is set.
    pub fn gate<S: 'static>(&self, listener: StateListener<S>) -> impl Fn(&S) + 'static {
        let flag = self.clone();
        move |state: &S| {
            if !flag.is_set() {
                listener(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn stop_flag_transitions_once() {
        let flag = StopFlag::new();
        assert!(flag.check().is_ok());
        assert!(flag.set());
        assert!(!flag.set());
        assert_eq!(flag.check(), Err(AdapterError::Stopped));
        assert!(!flag.admit_send("test"));
    }

    #[test]
    fn gated_listener_goes_quiet() {
        let flag = StopFlag::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let gated = flag.gate::<u8>(Box::new(move |_| h.set(h.get() + 1)));
        gated(&1);
        flag.set();
        gated(&2);
        assert_eq!(hits.get(), 1);
    }
}

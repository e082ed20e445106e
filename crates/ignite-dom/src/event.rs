#![forbid(unsafe_code)]

//! Events and listeners.
//!
//! [`EventListener`] compares by identity: two listeners are equal only when
//! they wrap the same allocation. This is what lets the property reconciler
//! skip re-registration when a component re-renders with a stable handler.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::node::Node;

/// A dispatched event.
pub struct Event {
    event_type: String,
    target: Node,
    current_target: RefCell<Option<Node>>,
    bubbles: bool,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
    detail: Option<String>,
}

impl Event {
    pub(crate) fn new(event_type: &str, target: Node, bubbles: bool, detail: Option<String>) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: RefCell::new(None),
            bubbles,
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
            detail,
        }
    }

    /// Event type, e.g. `click`.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Node the event was dispatched on.
    #[must_use]
    pub fn target(&self) -> &Node {
        &self.target
    }

    /// Node whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<Node> {
        self.current_target.borrow().clone()
    }

    pub(crate) fn set_current_target(&self, node: Option<Node>) {
        *self.current_target.borrow_mut() = node;
    }

    /// Whether the event propagates to ancestors.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Optional payload carried by custom events.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Stop propagation to further ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("bubbles", &self.bubbles)
            .field("detail", &self.detail)
            .finish()
    }
}

/// A listener callback with identity semantics.
#[derive(Clone)]
pub struct EventListener {
    callback: Rc<dyn Fn(&Event)>,
}

impl EventListener {
    /// Wrap a callback. Each call creates a distinct identity.
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.callback)(event);
    }

    /// Identity comparison.
    #[must_use]
    pub fn same_as(&self, other: &EventListener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for EventListener {}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({:p})", Rc::as_ptr(&self.callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a = EventListener::new(|_| {});
        let b = a.clone();
        let c = EventListener::new(|_| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

#![forbid(unsafe_code)]

//! Observable-object store driven by named methods.
//!
//! Sending a [`Command`] looks its `kind` up in the method table and applies
//! the method to a copy of the state. Unknown kinds are warned about and
//! dropped.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{Adapter, AdapterError, Scope, StateListener, StopFlag};
use crate::observable::{Observable, Subscription};

/// A method invocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Command {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

impl From<&str> for Command {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

type Method<S> = Rc<dyn Fn(&mut S, &Value)>;

pub struct ObservableStore<S> {
    state: Observable<S>,
    methods: AHashMap<String, Method<S>>,
}

impl<S: fmt::Debug> fmt::Debug for ObservableStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ObservableStore")
            .field("state", &self.state)
            .field("methods", &methods)
            .finish()
    }
}

impl<S: Clone + PartialEq + 'static> ObservableStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: Observable::new(initial),
            methods: AHashMap::new(),
        }
    }

    #[must_use]
    pub fn with_method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&mut S, &Value) + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Rc::new(method));
        self
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Invoke the method named by `command.kind`. Returns `false` if there
    /// is no such method.
    pub fn call(&self, command: &Command) -> bool {
        let Some(method) = self.methods.get(&command.kind) else {
            tracing::warn!(command = %command.kind, "no store method for command");
            return false;
        };
        let mut next = self.state.get();
        method(&mut next, &command.payload);
        self.state.set(next);
        true
    }

    pub fn state(&self) -> S {
        self.state.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> Subscription {
        self.state.subscribe(listener)
    }
}

/// [`Adapter`] over an [`ObservableStore`].
pub struct ObservableAdapter<S> {
    store: Rc<ObservableStore<S>>,
    scope: Scope,
    stopped: StopFlag,
}

impl<S: Clone + PartialEq + 'static> ObservableAdapter<S> {
    pub fn new(store: Rc<ObservableStore<S>>, scope: Scope) -> Self {
        Self {
            store,
            scope,
            stopped: StopFlag::new(),
        }
    }
}

impl<S: Clone + PartialEq + 'static> Adapter for ObservableAdapter<S> {
    type State = S;
    type Event = Command;

    fn scope(&self) -> Scope {
        self.scope
    }

    fn subscribe(&self, listener: StateListener<S>) -> Result<Subscription, AdapterError> {
        self.stopped.check()?;
        Ok(self.store.subscribe(self.stopped.gate(listener)))
    }

    fn send(&self, command: Command) {
        if self.stopped.admit_send("observable") {
            self.store.call(&command);
        }
    }

    fn get_state(&self) -> S {
        self.store.state()
    }

    fn stop(&self) {
        self.stopped.set();
    }

    fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Cart {
        items: Vec<String>,
    }

    fn cart() -> ObservableStore<Cart> {
        ObservableStore::new(Cart { items: Vec::new() })
            .with_method("add", |cart, payload| {
                if let Some(item) = payload.as_str() {
                    cart.items.push(item.to_string());
                }
            })
            .with_method("clear", |cart, _| cart.items.clear())
    }

    #[test]
    fn commands_dispatch_by_kind() {
        let store = cart();
        assert!(store.call(&Command::new("add").with_payload(json!("apple"))));
        assert!(store.call(&Command::new("add").with_payload(json!("pear"))));
        assert_eq!(store.state().items, vec!["apple", "pear"]);
        assert!(store.call(&"clear".into()));
        assert!(store.state().items.is_empty());
    }

    #[test]
    fn unknown_command_is_dropped() {
        let store = cart();
        assert!(!store.call(&Command::new("checkout")));
        assert!(!store.has_method("checkout"));
    }

    #[test]
    fn command_deserializes_from_event_shape() {
        let command: Command = serde_json::from_value(json!({"type": "add"})).unwrap();
        assert_eq!(command, Command::new("add"));
    }
}

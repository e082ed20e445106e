#![forbid(unsafe_code)]

//! Minimal finite-state-machine engine and its adapter.
//!
//! A [`MachineDefinition`] is inert; [`MachineActor`] runs one. Transitions
//! are chosen by event type, first passing guard wins. A transition without
//! a target is internal: its action runs but the state value is unchanged.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{Adapter, AdapterError, Scope, StateListener, StopFlag};
use crate::observable::{Observable, Subscription};

/// An event sent to a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl MachineEvent {
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

impl From<&str> for MachineEvent {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

type Guard<C> = Rc<dyn Fn(&C, &MachineEvent) -> bool>;
type Action<C> = Rc<dyn Fn(&mut C, &MachineEvent)>;

/// One candidate transition for an event type.
pub struct Transition<C> {
    target: Option<String>,
    guard: Option<Guard<C>>,
    action: Option<Action<C>>,
}

impl<C> Clone for Transition<C> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("guarded", &self.guard.is_some())
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl<C> Transition<C> {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            guard: None,
            action: None,
        }
    }

    /// Stay in the current state; only the action runs.
    pub fn internal() -> Self {
        Self {
            target: None,
            guard: None,
            action: None,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: impl Fn(&C, &MachineEvent) -> bool + 'static) -> Self {
        self.guard = Some(Rc::new(guard));
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Fn(&mut C, &MachineEvent) + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// A state and its outgoing transitions.
pub struct StateNode<C> {
    on: IndexMap<String, Vec<Transition<C>>>,
    is_final: bool,
}

impl<C> Default for StateNode<C> {
    fn default() -> Self {
        Self {
            on: IndexMap::new(),
            is_final: false,
        }
    }
}

impl<C> fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("on", &self.on)
            .field("is_final", &self.is_final)
            .finish()
    }
}

impl<C> StateNode<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transition for `event`. Several may be added; they are tried in
    /// insertion order.
    #[must_use]
    pub fn on(mut self, event: impl Into<String>, transition: Transition<C>) -> Self {
        self.on.entry(event.into()).or_default().push(transition);
        self
    }

    /// Mark as final: the machine ignores every further event.
    #[must_use]
    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// Machine blueprint: initial state, initial context, state table.
pub struct MachineDefinition<C> {
    id: String,
    initial: String,
    context: C,
    states: IndexMap<String, StateNode<C>>,
}

impl<C: fmt::Debug> fmt::Debug for MachineDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("context", &self.context)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: Clone + PartialEq + 'static> MachineDefinition<C> {
    pub fn new(id: impl Into<String>, initial: impl Into<String>, context: C) -> Self {
        Self {
            id: id.into(),
            initial: initial.into(),
            context,
            states: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn state(mut self, name: impl Into<String>, node: StateNode<C>) -> Self {
        self.states.insert(name.into(), node);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial_snapshot(&self) -> MachineSnapshot<C> {
        MachineSnapshot {
            value: self.initial.clone(),
            context: self.context.clone(),
            done: self
                .states
                .get(&self.initial)
                .is_some_and(|node| node.is_final),
        }
    }

    /// Compute the next snapshot, or `None` when no transition applies.
    pub fn transition(
        &self,
        snapshot: &MachineSnapshot<C>,
        event: &MachineEvent,
    ) -> Option<MachineSnapshot<C>> {
        if snapshot.done {
            return None;
        }
        let node = self.states.get(&snapshot.value)?;
        let transition = node
            .on
            .get(&event.kind)?
            .iter()
            .find(|t| t.guard.as_ref().is_none_or(|g| g(&snapshot.context, event)))?;

        let value = match &transition.target {
            Some(target) if self.states.contains_key(target) => target.clone(),
            Some(target) => {
                tracing::warn!(
                    machine = %self.id,
                    target = %target,
                    "transition target is not a declared state"
                );
                return None;
            }
            None => snapshot.value.clone(),
        };
        let mut context = snapshot.context.clone();
        if let Some(action) = &transition.action {
            action(&mut context, event);
        }
        let done = self.states.get(&value).is_some_and(|node| node.is_final);
        Some(MachineSnapshot {
            value,
            context,
            done,
        })
    }
}

/// Current state value plus extended context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot<C> {
    pub value: String,
    pub context: C,
    pub done: bool,
}

impl<C> MachineSnapshot<C> {
    pub fn matches(&self, state: &str) -> bool {
        self.value == state
    }
}

/// A running machine.
pub struct MachineActor<C> {
    definition: Rc<MachineDefinition<C>>,
    snapshot: Observable<MachineSnapshot<C>>,
    stopped: Cell<bool>,
}

impl<C: fmt::Debug> fmt::Debug for MachineActor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineActor")
            .field("machine", &self.definition.id)
            .field("stopped", &self.stopped.get())
            .finish()
    }
}

impl<C: Clone + PartialEq + 'static> MachineActor<C> {
    pub fn new(definition: Rc<MachineDefinition<C>>) -> Self {
        let snapshot = Observable::new(definition.initial_snapshot());
        Self {
            definition,
            snapshot,
            stopped: Cell::new(false),
        }
    }

    pub fn snapshot(&self) -> MachineSnapshot<C> {
        self.snapshot.get()
    }

    /// Apply `event`. Returns whether a transition was taken.
    pub fn send(&self, event: impl Into<MachineEvent>) -> bool {
        let event = event.into();
        if self.stopped.get() {
            tracing::warn!(machine = %self.definition.id, event = %event.kind, "event sent to stopped actor");
            return false;
        }
        let next = self
            .snapshot
            .with(|current| self.definition.transition(current, &event));
        match next {
            Some(next) => {
                tracing::debug!(
                    machine = %self.definition.id,
                    event = %event.kind,
                    state = %next.value,
                    "transition"
                );
                self.snapshot.set(next);
                true
            }
            None => false,
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&MachineSnapshot<C>) + 'static) -> Subscription {
        self.snapshot.subscribe(listener)
    }

    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

/// [`Adapter`] over a [`MachineActor`].
///
/// An adapter built from a definition owns its actor and stops it; one built
/// from a caller's running actor leaves the actor alone.
pub struct MachineAdapter<C> {
    actor: Rc<MachineActor<C>>,
    scope: Scope,
    owns_actor: bool,
    stopped: StopFlag,
}

impl<C: Clone + PartialEq + 'static> MachineAdapter<C> {
    /// Start a private actor for `definition`.
    pub fn spawn(definition: Rc<MachineDefinition<C>>) -> Self {
        Self {
            actor: Rc::new(MachineActor::new(definition)),
            scope: Scope::Isolated,
            owns_actor: true,
            stopped: StopFlag::new(),
        }
    }

    /// Wrap an actor the caller already runs.
    pub fn wrap(actor: Rc<MachineActor<C>>) -> Self {
        Self {
            actor,
            scope: Scope::Shared,
            owns_actor: false,
            stopped: StopFlag::new(),
        }
    }

    pub fn actor(&self) -> &Rc<MachineActor<C>> {
        &self.actor
    }
}

impl<C: Clone + PartialEq + 'static> Adapter for MachineAdapter<C> {
    type State = MachineSnapshot<C>;
    type Event = MachineEvent;

    fn scope(&self) -> Scope {
        self.scope
    }

    fn subscribe(&self, listener: StateListener<Self::State>) -> Result<Subscription, AdapterError> {
        self.stopped.check()?;
        Ok(self.actor.subscribe(self.stopped.gate(listener)))
    }

    fn send(&self, event: MachineEvent) {
        if self.stopped.admit_send("machine") {
            self.actor.send(event);
        }
    }

    fn get_state(&self) -> Self::State {
        self.actor.snapshot()
    }

    fn stop(&self) {
        if self.stopped.set() && self.owns_actor {
            self.actor.stop();
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }
}

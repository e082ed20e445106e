#![forbid(unsafe_code)]

//! Reducer-style store plus its whole-state and slice adapters.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::adapter::{Adapter, AdapterError, Scope, StateListener, StopFlag};
use crate::observable::{Observable, Subscription};

type ReducerFn<S, A> = Rc<dyn Fn(&S, &A) -> S>;

/// `(state, action) -> state` store.
pub struct ReducerStore<S, A> {
    state: Observable<S>,
    reducer: ReducerFn<S, A>,
}

impl<S: fmt::Debug, A> fmt::Debug for ReducerStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: Clone + PartialEq + 'static, A: 'static> ReducerStore<S, A> {
    pub fn new(initial: S, reducer: impl Fn(&S, &A) -> S + 'static) -> Self {
        Self {
            state: Observable::new(initial),
            reducer: Rc::new(reducer),
        }
    }

    /// Run the reducer. Subscribers hear about it only if the state changed.
    pub fn dispatch(&self, action: A) {
        let next = self.state.with(|state| (self.reducer)(state, &action));
        self.state.set(next);
    }

    pub fn get_state(&self) -> S {
        self.state.get()
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> Subscription {
        self.state.subscribe(listener)
    }
}

/// [`Adapter`] exposing the whole store state.
///
/// Reducer stores have no teardown of their own; `stop` only detaches this
/// adapter.
pub struct ReducerAdapter<S, A> {
    store: Rc<ReducerStore<S, A>>,
    scope: Scope,
    stopped: StopFlag,
}

impl<S: Clone + PartialEq + 'static, A: 'static> ReducerAdapter<S, A> {
    pub fn new(store: Rc<ReducerStore<S, A>>, scope: Scope) -> Self {
        Self {
            store,
            scope,
            stopped: StopFlag::new(),
        }
    }

    pub fn store(&self) -> &Rc<ReducerStore<S, A>> {
        &self.store
    }
}

impl<S: Clone + PartialEq + 'static, A: 'static> Adapter for ReducerAdapter<S, A> {
    type State = S;
    type Event = A;

    fn scope(&self) -> Scope {
        self.scope
    }

    fn subscribe(&self, listener: StateListener<S>) -> Result<Subscription, AdapterError> {
        self.stopped.check()?;
        Ok(self.store.subscribe(self.stopped.gate(listener)))
    }

    fn send(&self, action: A) {
        if self.stopped.admit_send("reducer") {
            self.store.dispatch(action);
        }
    }

    fn get_state(&self) -> S {
        self.store.get_state()
    }

    fn stop(&self) {
        self.stopped.set();
    }

    fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }
}

/// [`Adapter`] exposing one selected slice of a store.
///
/// Listeners fire only when the selected value changes, not on every store
/// update.
pub struct SliceAdapter<S, T, A> {
    store: Rc<ReducerStore<S, A>>,
    select: Rc<dyn Fn(&S) -> T>,
    stopped: StopFlag,
}

impl<S, T, A> SliceAdapter<S, T, A>
where
    S: Clone + PartialEq + 'static,
    T: Clone + PartialEq + 'static,
    A: 'static,
{
    pub fn new(store: Rc<ReducerStore<S, A>>, select: impl Fn(&S) -> T + 'static) -> Self {
        Self {
            store,
            select: Rc::new(select),
            stopped: StopFlag::new(),
        }
    }
}

impl<S, T, A> Adapter for SliceAdapter<S, T, A>
where
    S: Clone + PartialEq + 'static,
    T: Clone + PartialEq + 'static,
    A: 'static,
{
    type State = T;
    type Event = A;

    fn scope(&self) -> Scope {
        Scope::Shared
    }

    fn subscribe(&self, listener: StateListener<T>) -> Result<Subscription, AdapterError> {
        self.stopped.check()?;
        let select = Rc::clone(&self.select);
        let last = RefCell::new(self.store.state.with(|s| select(s)));
        let listener = self.stopped.gate(listener);
        Ok(self.store.subscribe(move |state| {
            let next = select(state);
            if *last.borrow() == next {
                return;
            }
            *last.borrow_mut() = next.clone();
            listener(&next);
        }))
    }

    fn send(&self, action: A) {
        if self.stopped.admit_send("slice") {
            self.store.dispatch(action);
        }
    }

    fn get_state(&self) -> T {
        self.store.state.with(|s| (self.select)(s))
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
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Todos {
        items: Vec<String>,
        filter: String,
    }

    enum Action {
        Add(&'static str),
        Filter(&'static str),
        Noop,
    }

    fn reduce(state: &Todos, action: &Action) -> Todos {
        let mut next = state.clone();
        match action {
            Action::Add(item) => next.items.push((*item).to_string()),
            Action::Filter(filter) => next.filter = (*filter).to_string(),
            Action::Noop => {}
        }
        next
    }

    fn store() -> Rc<ReducerStore<Todos, Action>> {
        Rc::new(ReducerStore::new(
            Todos {
                items: Vec::new(),
                filter: "all".into(),
            },
            reduce,
        ))
    }

    #[test]
    fn dispatch_notifies_on_change_only() {
        let store = store();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = store.subscribe(move |_| h.set(h.get() + 1));
        store.dispatch(Action::Add("milk"));
        store.dispatch(Action::Noop);
        assert_eq!(hits.get(), 1);
        assert_eq!(store.version(), 1);
        assert_eq!(store.get_state().items, vec!["milk".to_string()]);
    }

    #[test]
    fn slice_dedupes_unrelated_updates() {
        let store = store();
        let slice = SliceAdapter::new(Rc::clone(&store), |s: &Todos| s.items.len());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = slice
            .subscribe(Box::new(move |n: &usize| s.borrow_mut().push(*n)))
            .unwrap();
        slice.send(Action::Filter("done"));
        slice.send(Action::Add("eggs"));
        slice.send(Action::Filter("all"));
        slice.send(Action::Add("tea"));
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(slice.get_state(), 2);
    }

    #[test]
    fn stopped_adapter_ignores_send() {
        let store = store();
        let adapter = ReducerAdapter::new(Rc::clone(&store), Scope::Shared);
        adapter.stop();
        adapter.send(Action::Add("x"));
        assert!(store.get_state().items.is_empty());
        assert!(adapter.subscribe(Box::new(|_| {})).is_err());
    }
}

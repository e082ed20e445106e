#![forbid(unsafe_code)]

//! Version-tracked shared value with change notification.
//!
//! Every store engine keeps its state in an [`Observable`], so they all share
//! one notification discipline:
//!
//! - the version moves only when the stored value actually changes;
//! - callbacks run in the order they subscribed;
//! - a dropped [`Subscription`] is never called again.
//!
//! Callbacks run on a snapshot of the subscriber list taken after the value
//! was stored, so a callback may `set` the same observable. The nested call
//! notifies with the newer value.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, version-tracked value.
///
/// Cloning yields another handle to the **same** value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers when it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Derive a new value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Register `callback`. It stays registered while the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(Box::new(callback));
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.push(Rc::downgrade(&callback));
        Subscription::new(callback)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        let (value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }
}

/// RAII guard for a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Rc<dyn Any>>,
    on_release: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    fn new<T: 'static>(callback: Rc<Callback<T>>) -> Self {
        Self {
            guard: Some(callback as Rc<dyn Any>),
            on_release: None,
        }
    }

    /// Wrap another subscription, running `on_release` when it ends.
    pub fn with_release(mut self, on_release: impl FnOnce() + 'static) -> Self {
        self.on_release = Some(Box::new(on_release));
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Unsubscribe explicitly.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.guard = None;
        if let Some(on_release) = self.on_release.take() {
            on_release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[test]
    fn equal_set_is_a_no_op() {
        let obs = Observable::new(1);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));
        obs.set(1);
        assert_eq!(obs.version(), 0);
        assert_eq!(hits.get(), 0);
        obs.set(2);
        assert_eq!(obs.version(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn notifies_in_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let log = Rc::clone(&log);
                obs.subscribe(move |v| log.borrow_mut().push((i, *v)))
            })
            .collect();
        obs.set(5);
        assert_eq!(*log.borrow(), vec![(0, 5), (1, 5), (2, 5)]);
        drop(subs);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = obs.subscribe(move |_| h.set(h.get() + 1));
        obs.set(1);
        sub.unsubscribe();
        obs.set(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn nested_set_from_subscriber() {
        let obs = Observable::new(0);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn release_hook_runs_once() {
        let obs = Observable::new(0);
        let released = Rc::new(Cell::new(0));
        let r = Rc::clone(&released);
        let sub = obs
            .subscribe(|_| {})
            .with_release(move || r.set(r.get() + 1));
        sub.unsubscribe();
        assert_eq!(released.get(), 1);
    }
}

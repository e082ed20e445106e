#![forbid(unsafe_code)]

//! Read-optimized shared stores.
//!
//! Configuration and the no-diff denylist are read on every render pass and
//! written only at setup or in tests. [`ArcSwapStore`] makes reads a single
//! atomic load that never blocks, while writers publish a whole new snapshot.
//!
//! # Invariants
//!
//! 1. A `load()` always observes a complete snapshot (no torn reads).
//! 2. `store()` replaces the snapshot atomically; readers holding an older
//!    `Arc` keep seeing the old value until they load again.

use std::sync::Arc;

use arc_swap::ArcSwap;

/// A value that is read far more often than it is written.
pub trait ReadOptimized<T> {
    /// Current snapshot.
    fn load(&self) -> Arc<T>;

    /// Publish a new snapshot.
    fn store(&self, value: T);

    /// Derive and publish a new snapshot from the current one.
    fn update(&self, f: impl Fn(&T) -> T);
}

/// [`ReadOptimized`] store backed by [`ArcSwap`].
#[derive(Debug)]
pub struct ArcSwapStore<T> {
    inner: ArcSwap<T>,
}

impl<T> ArcSwapStore<T> {
    /// Create a store holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(value),
        }
    }
}

impl<T: Default> Default for ArcSwapStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> ReadOptimized<T> for ArcSwapStore<T> {
    fn load(&self) -> Arc<T> {
        self.inner.load_full()
    }

    fn store(&self, value: T) {
        self.inner.store(Arc::new(value));
    }

    fn update(&self, f: impl Fn(&T) -> T) {
        self.inner.rcu(|current| Arc::new(f(current)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_latest_store() {
        let store = ArcSwapStore::new(1u64);
        assert_eq!(*store.load(), 1);
        store.store(7);
        assert_eq!(*store.load(), 7);
    }

    #[test]
    fn old_snapshot_survives_store() {
        let store = ArcSwapStore::new(String::from("a"));
        let before = store.load();
        store.store(String::from("b"));
        assert_eq!(before.as_str(), "a");
        assert_eq!(store.load().as_str(), "b");
    }

    #[test]
    fn update_derives_from_current() {
        let store = ArcSwapStore::new(vec![1, 2]);
        store.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert_eq!(*store.load(), vec![1, 2, 3]);
    }
}

#![forbid(unsafe_code)]

//! No-diff denylist: tags that are always replaced, never patched.
//!
//! A process-wide registry backs the default strategies. Tests and embedders
//! that need isolation construct their own [`NoDiffRegistry`] and inject it.

use std::sync::{Arc, OnceLock};

use ahash::AHashSet;
use ignite_core::{ArcSwapStore, ReadOptimized};

/// Read-mostly set of lower-cased tag names.
#[derive(Debug, Default)]
pub struct NoDiffRegistry {
    tags: ArcSwapStore<AHashSet<String>>,
}

static GLOBAL: OnceLock<Arc<NoDiffRegistry>> = OnceLock::new();

impl NoDiffRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `tags`.
    pub fn with_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let registry = Self::new();
        for tag in tags {
            registry.register(tag);
        }
        registry
    }

    /// The process-wide registry.
    pub fn global() -> Arc<NoDiffRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(NoDiffRegistry::new())))
    }

    pub fn register(&self, tag: &str) {
        let tag = tag.to_ascii_lowercase();
        self.tags.update(|current| {
            let mut next = current.clone();
            next.insert(tag.clone());
            next
        });
    }

    pub fn unregister(&self, tag: &str) {
        let tag = tag.to_ascii_lowercase();
        self.tags.update(|current| {
            let mut next = current.clone();
            next.remove(&tag);
            next
        });
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        let tags = self.tags.load();
        tags.contains(tag) || tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn clear(&self) {
        self.tags.store(AHashSet::new());
    }

    /// Sorted snapshot of registered tags.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tags.load().iter().cloned().collect();
        tags.sort_unstable();
        tags
    }
}

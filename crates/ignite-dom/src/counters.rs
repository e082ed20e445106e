#![forbid(unsafe_code)]

//! Per-document mutation counters.
//!
//! Counters make "this render touched nothing" an assertable property: take a
//! [`MutationSnapshot`] before and after and compare.

use std::cell::Cell;
use std::ops::Sub;

/// Live counters owned by a [`Document`](crate::Document).
#[derive(Debug, Default)]
pub struct MutationCounters {
    nodes_inserted: Cell<u64>,
    nodes_removed: Cell<u64>,
    attribute_writes: Cell<u64>,
    attribute_removals: Cell<u64>,
    property_writes: Cell<u64>,
    value_writes: Cell<u64>,
    checked_writes: Cell<u64>,
    text_writes: Cell<u64>,
    style_writes: Cell<u64>,
    listeners_added: Cell<u64>,
    listeners_removed: Cell<u64>,
}

fn bump(cell: &Cell<u64>) {
    cell.set(cell.get().saturating_add(1));
}

impl MutationCounters {
    pub(crate) fn node_inserted(&self) {
        bump(&self.nodes_inserted);
    }
    pub(crate) fn node_removed(&self) {
        bump(&self.nodes_removed);
    }
    pub(crate) fn attribute_written(&self) {
        bump(&self.attribute_writes);
    }
    pub(crate) fn attribute_removed(&self) {
        bump(&self.attribute_removals);
    }
    pub(crate) fn property_written(&self) {
        bump(&self.property_writes);
    }
    pub(crate) fn value_written(&self) {
        bump(&self.value_writes);
    }
    pub(crate) fn checked_written(&self) {
        bump(&self.checked_writes);
    }
    pub(crate) fn text_written(&self) {
        bump(&self.text_writes);
    }
    pub(crate) fn style_written(&self) {
        bump(&self.style_writes);
    }
    pub(crate) fn listener_added(&self) {
        bump(&self.listeners_added);
    }
    pub(crate) fn listener_removed(&self) {
        bump(&self.listeners_removed);
    }

    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MutationSnapshot {
        MutationSnapshot {
            nodes_inserted: self.nodes_inserted.get(),
            nodes_removed: self.nodes_removed.get(),
            attribute_writes: self.attribute_writes.get(),
            attribute_removals: self.attribute_removals.get(),
            property_writes: self.property_writes.get(),
            value_writes: self.value_writes.get(),
            checked_writes: self.checked_writes.get(),
            text_writes: self.text_writes.get(),
            style_writes: self.style_writes.get(),
            listeners_added: self.listeners_added.get(),
            listeners_removed: self.listeners_removed.get(),
        }
    }
}

/// Point-in-time copy of [`MutationCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSnapshot {
    pub nodes_inserted: u64,
    pub nodes_removed: u64,
    pub attribute_writes: u64,
    pub attribute_removals: u64,
    pub property_writes: u64,
    /// Invocations of the `value` setter.
    pub value_writes: u64,
    /// Invocations of the `checked` setter.
    pub checked_writes: u64,
    pub text_writes: u64,
    pub style_writes: u64,
    pub listeners_added: u64,
    pub listeners_removed: u64,
}

impl MutationSnapshot {
    /// Sum of every counter.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.nodes_inserted
            + self.nodes_removed
            + self.attribute_writes
            + self.attribute_removals
            + self.property_writes
            + self.value_writes
            + self.checked_writes
            + self.text_writes
            + self.style_writes
            + self.listeners_added
            + self.listeners_removed
    }
}

impl Sub for MutationSnapshot {
    type Output = MutationSnapshot;

    fn sub(self, earlier: Self) -> Self::Output {
        MutationSnapshot {
            nodes_inserted: self.nodes_inserted.saturating_sub(earlier.nodes_inserted),
            nodes_removed: self.nodes_removed.saturating_sub(earlier.nodes_removed),
            attribute_writes: self.attribute_writes.saturating_sub(earlier.attribute_writes),
            attribute_removals: self
                .attribute_removals
                .saturating_sub(earlier.attribute_removals),
            property_writes: self.property_writes.saturating_sub(earlier.property_writes),
            value_writes: self.value_writes.saturating_sub(earlier.value_writes),
            checked_writes: self.checked_writes.saturating_sub(earlier.checked_writes),
            text_writes: self.text_writes.saturating_sub(earlier.text_writes),
            style_writes: self.style_writes.saturating_sub(earlier.style_writes),
            listeners_added: self.listeners_added.saturating_sub(earlier.listeners_added),
            listeners_removed: self
                .listeners_removed
                .saturating_sub(earlier.listeners_removed),
        }
    }
}

#![forbid(unsafe_code)]

//! Structural fallback reasons and their reporting hook.

use std::fmt;
use std::rc::Rc;

use ignite_core::LogLevel;

/// Why a level was replaced instead of patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// Tag is on the no-diff denylist.
    DenylistTag,
    /// Host carries the hydration marker.
    HydratedHost,
    /// Host opted out of diffing.
    OptedOutHost,
    /// Configured patch mode is `replace`.
    ConfigReplace,
    /// Diffing is globally disabled.
    DiffDisabled,
    ChildOrderChange,
    ChildRemoved,
    NodeKindMismatch,
    TagMismatch,
}

impl FallbackReason {
    pub const ALL: [Self; 9] = [
        Self::DenylistTag,
        Self::HydratedHost,
        Self::OptedOutHost,
        Self::ConfigReplace,
        Self::DiffDisabled,
        Self::ChildOrderChange,
        Self::ChildRemoved,
        Self::NodeKindMismatch,
        Self::TagMismatch,
    ];

    /// Stable machine-readable name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DenylistTag => "denylist-tag",
            Self::HydratedHost => "hydrated-host",
            Self::OptedOutHost => "opted-out-host",
            Self::ConfigReplace => "config-replace",
            Self::DiffDisabled => "diff-disabled",
            Self::ChildOrderChange => "child-order-change",
            Self::ChildRemoved => "child-removed",
            Self::NodeKindMismatch => "node-kind-mismatch",
            Self::TagMismatch => "tag-mismatch",
        }
    }

    /// Whether the reason comes from host or configuration flags rather than
    /// from comparing trees.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(
            self,
            Self::HydratedHost | Self::OptedOutHost | Self::ConfigReplace | Self::DiffDisabled
        )
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub reason: FallbackReason,
    /// Tag of the element whose subtree was replaced; `None` for the host
    /// level.
    pub tag: Option<String>,
}

impl Fallback {
    #[must_use]
    pub fn host(reason: FallbackReason) -> Self {
        Self { reason, tag: None }
    }

    #[must_use]
    pub fn at(reason: FallbackReason, tag: &str) -> Self {
        Self {
            reason,
            tag: Some(tag.to_string()),
        }
    }
}

type FallbackHook = dyn Fn(&Fallback);

/// Routes fallbacks to `tracing` (gated by [`LogLevel`]) and to an optional
/// caller hook.
#[derive(Clone, Default)]
pub struct FallbackReporter {
    level: LogLevel,
    hook: Option<Rc<FallbackHook>>,
}

impl fmt::Debug for FallbackReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackReporter")
            .field("level", &self.level)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl FallbackReporter {
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self { level, hook: None }
    }

    /// Install a hook that observes every fallback regardless of log level.
    #[must_use]
    pub fn with_hook(mut self, hook: impl Fn(&Fallback) + 'static) -> Self {
        self.hook = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn report(&self, fallback: &Fallback) {
        if self.level.allows(LogLevel::Debug) {
            tracing::debug!(
                reason = fallback.reason.as_str(),
                tag = fallback.tag.as_deref().unwrap_or("#host"),
                forced = fallback.reason.is_forced(),
                "ignite.fallback"
            );
        } else if self.level.allows(LogLevel::Warn) {
            tracing::warn!(reason = fallback.reason.as_str(), "ignite.fallback");
        }
        if let Some(hook) = &self.hook {
            hook(fallback);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn reason_strings_are_distinct() {
        let mut names: Vec<_> = FallbackReason::ALL.iter().map(|r| r.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FallbackReason::ALL.len());
        assert_eq!(FallbackReason::ChildOrderChange.to_string(), "child-order-change");
    }

    #[test]
    fn hook_fires_even_when_logging_is_off() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reporter = FallbackReporter::new(LogLevel::Off)
            .with_hook(move |f| sink.borrow_mut().push(f.reason));
        reporter.report(&Fallback::at(FallbackReason::TagMismatch, "div"));
        assert_eq!(*seen.borrow(), vec![FallbackReason::TagMismatch]);
    }
}

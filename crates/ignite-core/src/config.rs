#![forbid(unsafe_code)]

//! Configuration surface consumed by render strategies.
//!
//! [`IgniteConfig`] carries the renderer selector, the patch-mode selector, the
//! logging verbosity, the global diffing escape hatch, and global styles to
//! inject into every component's shadow root.
//!
//! Values are layered: defaults, then the process-global store
//! ([`set_global_config`]), then environment variables when the caller opts in
//! via [`IgniteConfig::with_env_overrides`]. A render strategy takes one
//! snapshot at construction and never re-reads it.
//!
//! # Environment variables
//!
//! | variable | values |
//! |---|---|
//! | `IGNITE_RENDERER` | `lit`, `ignite-jsx` |
//! | `IGNITE_PATCH_MODE` | `diff`, `replace` |
//! | `IGNITE_LOG` | `off`, `warn`, `debug` |
//! | `IGNITE_DIFF` | `0`/`false` disables diffing |

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::read_optimized::{ArcSwapStore, ReadOptimized};

/// Errors produced while parsing configuration selectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown renderer: {value} (expected \"lit\" or \"ignite-jsx\")")]
    UnknownRenderer { value: String },

    #[error("unknown patch mode: {value} (expected \"diff\" or \"replace\")")]
    UnknownPatchMode { value: String },

    #[error("unknown log level: {value} (expected \"off\", \"warn\" or \"debug\")")]
    UnknownLogLevel { value: String },
}

/// Which render strategy hosts a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RendererKind {
    /// Template-string backend: whole-subtree replacement on every render.
    #[serde(rename = "lit")]
    Lit,
    /// JSX backend driven by the diff/patch engine.
    #[default]
    #[serde(rename = "ignite-jsx")]
    IgniteJsx,
}

impl RendererKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lit => "lit",
            Self::IgniteJsx => "ignite-jsx",
        }
    }
}

impl FromStr for RendererKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lit" => Ok(Self::Lit),
            "ignite-jsx" | "jsx" => Ok(Self::IgniteJsx),
            other => Err(ConfigError::UnknownRenderer {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the JSX strategy reconciles successive renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchMode {
    /// Incremental patching with structural fallbacks.
    #[default]
    Diff,
    /// Always clear and rebuild.
    Replace,
}

impl PatchMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diff => "diff",
            Self::Replace => "replace",
        }
    }
}

impl FromStr for PatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "diff" => Ok(Self::Diff),
            "replace" => Ok(Self::Replace),
            other => Err(ConfigError::UnknownPatchMode {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity of fallback and lifecycle diagnostics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Off,
    Warn,
    Debug,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Debug => "debug",
        }
    }

    /// Whether a diagnostic at `level` should be emitted under this setting.
    #[must_use]
    pub fn allows(self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "off" | "" => Ok(Self::Off),
            "warn" => Ok(Self::Warn),
            "debug" => Ok(Self::Debug),
            other => Err(ConfigError::UnknownLogLevel {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A global stylesheet injected into each component's shadow root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleSource {
    /// Inline CSS text, injected as a `<style>` element.
    Inline(String),
    /// Stylesheet URL, injected as a `<link rel="stylesheet">` element.
    Href(String),
}

impl StyleSource {
    /// Whether the source carries something injectable.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Inline(css) => !css.trim().is_empty(),
            Self::Href(href) => {
                let href = href.trim();
                !href.is_empty() && !href.chars().any(char::is_whitespace)
            }
        }
    }
}

/// Configuration read once at render-strategy construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IgniteConfig {
    /// Renderer selector.
    pub renderer: RendererKind,
    /// Patch-mode selector for the JSX renderer.
    pub patch_mode: PatchMode,
    /// Logging verbosity for fallback reasons.
    pub log_level: LogLevel,
    /// Global escape hatch: when false, every render is a full replace.
    pub diffing_enabled: bool,
    /// Styles injected into every content root's shadow tree.
    pub global_styles: Vec<StyleSource>,
}

impl Default for IgniteConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            patch_mode: PatchMode::default(),
            log_level: LogLevel::default(),
            diffing_enabled: true,
            global_styles: Vec::new(),
        }
    }
}

impl IgniteConfig {
    /// Set the renderer selector.
    #[must_use]
    pub fn with_renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the patch mode.
    #[must_use]
    pub fn with_patch_mode(mut self, mode: PatchMode) -> Self {
        self.patch_mode = mode;
        self
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Toggle the diffing escape hatch.
    #[must_use]
    pub fn with_diffing(mut self, enabled: bool) -> Self {
        self.diffing_enabled = enabled;
        self
    }

    /// Add a global style source.
    #[must_use]
    pub fn with_global_style(mut self, source: StyleSource) -> Self {
        self.global_styles.push(source);
        self
    }

    /// Apply `IGNITE_*` environment overrides on top of `self`.
    ///
    /// Unparseable values are ignored with a warning; the field keeps its
    /// previous value.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (testable form of
    /// [`with_env_overrides`](Self::with_env_overrides)).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("IGNITE_RENDERER") {
            match val.parse() {
                Ok(renderer) => self.renderer = renderer,
                Err(err) => tracing::warn!(%err, "ignoring IGNITE_RENDERER"),
            }
        }
        if let Some(val) = lookup("IGNITE_PATCH_MODE") {
            match val.parse() {
                Ok(mode) => self.patch_mode = mode,
                Err(err) => tracing::warn!(%err, "ignoring IGNITE_PATCH_MODE"),
            }
        }
        if let Some(val) = lookup("IGNITE_LOG") {
            match val.parse() {
                Ok(level) => self.log_level = level,
                Err(err) => tracing::warn!(%err, "ignoring IGNITE_LOG"),
            }
        }
        if let Some(val) = lookup("IGNITE_DIFF") {
            let val = val.trim();
            self.diffing_enabled = !(val == "0" || val.eq_ignore_ascii_case("false"));
        }
        self
    }

    /// Global styles that survive validation. Malformed entries are dropped
    /// with a warning.
    #[must_use]
    pub fn valid_global_styles(&self) -> Vec<&StyleSource> {
        self.global_styles
            .iter()
            .filter(|source| {
                let ok = source.is_well_formed();
                if !ok {
                    tracing::warn!(?source, "skipping malformed global style");
                }
                ok
            })
            .collect()
    }
}

// ─── Process-global store ────────────────────────────────────────────────────

fn store() -> &'static ArcSwapStore<IgniteConfig> {
    static GLOBAL: OnceLock<ArcSwapStore<IgniteConfig>> = OnceLock::new();
    GLOBAL.get_or_init(ArcSwapStore::default)
}

/// Snapshot of the process-global configuration.
#[must_use]
pub fn global_config() -> IgniteConfig {
    IgniteConfig::clone(&store().load())
}

/// Replace the process-global configuration.
pub fn set_global_config(config: IgniteConfig) {
    store().store(config);
}

/// Restore the process-global configuration to defaults.
pub fn reset_global_config() {
    store().store(IgniteConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_diff_with_jsx() {
        let config = IgniteConfig::default();
        assert_eq!(config.renderer, RendererKind::IgniteJsx);
        assert_eq!(config.patch_mode, PatchMode::Diff);
        assert_eq!(config.log_level, LogLevel::Off);
        assert!(config.diffing_enabled);
    }

    #[test]
    fn selectors_parse_and_display() {
        assert_eq!("lit".parse::<RendererKind>(), Ok(RendererKind::Lit));
        assert_eq!("replace".parse::<PatchMode>(), Ok(PatchMode::Replace));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(RendererKind::IgniteJsx.to_string(), "ignite-jsx");
        assert!(matches!(
            "svelte".parse::<RendererKind>(),
            Err(ConfigError::UnknownRenderer { .. })
        ));
    }

    #[test]
    fn log_level_ordering() {
        assert!(!LogLevel::Off.allows(LogLevel::Warn));
        assert!(LogLevel::Warn.allows(LogLevel::Warn));
        assert!(!LogLevel::Warn.allows(LogLevel::Debug));
        assert!(LogLevel::Debug.allows(LogLevel::Warn));
        assert!(!LogLevel::Debug.allows(LogLevel::Off));
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let config = IgniteConfig::default().with_overrides(lookup(&[
            ("IGNITE_RENDERER", "lit"),
            ("IGNITE_PATCH_MODE", "sideways"),
            ("IGNITE_LOG", "warn"),
            ("IGNITE_DIFF", "false"),
        ]));
        assert_eq!(config.renderer, RendererKind::Lit);
        assert_eq!(config.patch_mode, PatchMode::Diff);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(!config.diffing_enabled);
    }

    #[test]
    fn malformed_styles_filtered() {
        let config = IgniteConfig::default()
            .with_global_style(StyleSource::Inline(":host { display: block }".into()))
            .with_global_style(StyleSource::Inline("   ".into()))
            .with_global_style(StyleSource::Href("bad url.css".into()));
        assert_eq!(config.valid_global_styles().len(), 1);
    }

    #[test]
    fn serde_uses_wire_names() {
        let config = IgniteConfig::default().with_renderer(RendererKind::Lit);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["renderer"], "lit");
        assert_eq!(json["patchMode"], "diff");
        let back: IgniteConfig =
            serde_json::from_str(r#"{"renderer":"ignite-jsx","logLevel":"debug"}"#).unwrap();
        assert_eq!(back.log_level, LogLevel::Debug);
        assert!(back.diffing_enabled);
    }

    #[test]
    fn global_store_roundtrip() {
        set_global_config(IgniteConfig::default().with_patch_mode(PatchMode::Replace));
        assert_eq!(global_config().patch_mode, PatchMode::Replace);
        reset_global_config();
        assert_eq!(global_config().patch_mode, PatchMode::Diff);
    }

    mod selectors {
        use proptest::prelude::*;

        use super::*;

        fn renderer() -> impl Strategy<Value = RendererKind> {
            prop_oneof![Just(RendererKind::Lit), Just(RendererKind::IgniteJsx)]
        }

        fn patch_mode() -> impl Strategy<Value = PatchMode> {
            prop_oneof![Just(PatchMode::Diff), Just(PatchMode::Replace)]
        }

        fn log_level() -> impl Strategy<Value = LogLevel> {
            prop_oneof![Just(LogLevel::Off), Just(LogLevel::Warn), Just(LogLevel::Debug)]
        }

        proptest! {
            #[test]
            fn wire_names_parse_back(
                r in renderer(),
                m in patch_mode(),
                l in log_level(),
                pad in "[ \t]{0,3}",
            ) {
                prop_assert_eq!(format!("{pad}{}{pad}", r.as_str()).parse::<RendererKind>().ok(), Some(r));
                prop_assert_eq!(format!("{pad}{}{pad}", m.as_str()).parse::<PatchMode>().ok(), Some(m));
                prop_assert_eq!(format!("{pad}{}{pad}", l.as_str()).parse::<LogLevel>().ok(), Some(l));
            }

            #[test]
            fn unknown_selectors_are_rejected(value in "[A-Z][a-z]{1,8}") {
                prop_assert!(value.parse::<RendererKind>().is_err());
                prop_assert!(value.parse::<PatchMode>().is_err());
                prop_assert!(value.parse::<LogLevel>().is_err());
            }

            #[test]
            fn off_never_allows_anything(l in log_level()) {
                prop_assert!(!LogLevel::Off.allows(l));
                prop_assert!(!l.allows(LogLevel::Off));
            }
        }
    }
}

#![forbid(unsafe_code)]

//! Core: configuration surface, log levels, and read-optimized shared stores.
//!
//! Every other Ignite crate reads its knobs from [`config::IgniteConfig`].
//! Configuration is snapshotted once when a render strategy is constructed and
//! is never re-read reactively.

pub mod config;
pub mod read_optimized;

pub use config::{
    ConfigError, IgniteConfig, LogLevel, PatchMode, RendererKind, StyleSource, global_config,
    reset_global_config, set_global_config,
};
pub use read_optimized::{ArcSwapStore, ReadOptimized};

#![forbid(unsafe_code)]

//! Aggregate error type for the runtime.

use ignite_core::ConfigError;
use ignite_render::RenderError;

use crate::adapter::AdapterError;
use crate::definition::FacadeError;
use crate::registry::RegistryError;

/// Any usage error surfaced by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum IgniteError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Facade(#[from] FacadeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, IgniteError>;

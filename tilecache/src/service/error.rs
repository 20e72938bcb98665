//! Service error types.

use thiserror::Error;

use crate::cache::{CacheError, MirrorError};
use crate::config::ConfigFileError;
use crate::provider::FetchError;

/// Errors that can occur while starting or using the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Failed to open the tile store
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Failed to build the HTTP client or fetch a tile
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The persistent mirror directory could not be opened
    #[error("Mirror error: {0}")]
    Mirror(#[from] MirrorError),

    /// Invalid configuration file
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),
}

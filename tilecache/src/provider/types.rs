//! Provider error types

use thiserror::Error;

use crate::coord::TileCoord;

/// Errors raised while fetching a tile over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Request could not be sent or no response arrived
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Response body could not be read
    #[error("Failed to read response from {url}: {message}")]
    Body { url: String, message: String },

    /// Tile coordinate is outside the supported zoom range
    #[error("Tile {coord} is beyond the maximum zoom level {max_zoom}")]
    UnsupportedZoom { coord: TileCoord, max_zoom: u8 },

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// URL of the failed request, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Body { url, .. } => Some(url),
            FetchError::UnsupportedZoom { .. } | FetchError::ClientBuild(_) => None,
        }
    }

    /// HTTP status code for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

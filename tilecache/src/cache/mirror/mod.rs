//! Persistent mirror for the tile cache.
//!
//! The in-memory store is written through to a [`TileMirror`] so that tiles
//! survive a restart. Mirror I/O never blocks a cache lookup: every change is
//! queued on a [`MirrorWriter`], which applies operations one at a time in the
//! order they were issued.
//!
//! # Implementations
//!
//! - [`DiskMirror`]: one bincode record per tile in a directory
//! - [`MemoryMirror`]: shared in-process map, for tests and simulated restarts
//! - [`NoOpMirror`]: persistence disabled

mod disk;
mod memory;
mod writer;

pub use disk::{DiskMirror, SCHEMA_VERSION};
pub use memory::{MemoryMirror, NoOpMirror};
pub use writer::{MirrorStats, MirrorWriter};

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::cache::types::CachedTile;

/// Boxed future returned by [`TileMirror`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors raised by a mirror backend.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Mirror I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode tile record: {0}")]
    Encode(#[source] bincode::Error),

    #[error("Failed to decode tile record: {0}")]
    Decode(#[source] bincode::Error),

    /// The directory was written by a newer release.
    #[error("Unsupported mirror schema version {found} (supported: {supported})")]
    Schema { found: u32, supported: u32 },
}

/// Durable backing store for cached tiles.
///
/// Implementations must be safe to share across tasks. The store only ever
/// calls `store`, `delete` and `clear` from its single writer task.
pub trait TileMirror: Send + Sync {
    /// Load every persisted tile. Called once when a store opens.
    fn load_all(&self) -> BoxFuture<'_, Result<Vec<CachedTile>, MirrorError>>;

    /// Insert or replace the record for `tile.url`.
    fn store(&self, tile: CachedTile) -> BoxFuture<'_, Result<(), MirrorError>>;

    /// Remove the record for `url`. Missing records are not an error.
    fn delete<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), MirrorError>>;

    /// Remove every record.
    fn clear(&self) -> BoxFuture<'_, Result<(), MirrorError>>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

//! Tile cache.
//!
//! [`TileCacheStore`] keeps tile payloads in memory, keyed by request URL. It
//! enforces a byte capacity by evicting the tiles with the lowest retention
//! score, expires tiles past their TTL on a periodic sweep, and writes every
//! change through to a [`TileMirror`] so the cache survives a restart.

mod eviction;
pub mod mirror;
mod stats;
mod store;
mod sweeper;
mod types;

pub use eviction::{eviction_order, retention_score, ACCESS_WEIGHT, RECENCY_WEIGHT};
pub use mirror::{
    DiskMirror, MemoryMirror, MirrorError, MirrorStats, MirrorWriter, NoOpMirror, TileMirror,
    SCHEMA_VERSION,
};
pub use stats::CacheStats;
pub use store::TileCacheStore;
pub use sweeper::SweepDaemon;
pub use types::{
    CacheError, CachedTile, TileCacheConfig, DEFAULT_CAPACITY_BYTES, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_TTL,
};

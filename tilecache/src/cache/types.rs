//! Core types for the tile cache.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::cache::mirror::MirrorError;

/// Default in-memory capacity (50 MiB).
pub const DEFAULT_CAPACITY_BYTES: u64 = 50 * 1024 * 1024;

/// Default time-to-live for a cached tile (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default interval between expiry sweeps (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A cached tile image keyed by its fully-resolved request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTile {
    /// Tile request URL (primary key)
    pub url: String,
    /// Opaque image payload
    pub data: Bytes,
    /// Write time, ms since the Unix epoch. Drives TTL expiry.
    pub timestamp: u64,
    /// Number of hits, starting at 1 on insert
    pub access_count: u64,
    /// Most recent hit, ms since the Unix epoch
    pub last_accessed: u64,
}

impl CachedTile {
    /// Create a freshly written tile.
    pub fn new(url: impl Into<String>, data: Bytes, now: u64) -> Self {
        Self {
            url: url.into(),
            data,
            timestamp: now,
            access_count: 1,
            last_accessed: now,
        }
    }

    /// Payload size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Record a hit.
    pub fn touch(&mut self, now: u64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed = self.last_accessed.max(now);
    }

    /// Milliseconds since the tile was written.
    #[inline]
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    /// Milliseconds since the last hit.
    #[inline]
    pub fn idle_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_accessed)
    }

    /// True once the tile's age exceeds `ttl`.
    #[inline]
    pub fn is_expired_at(&self, now: u64, ttl: Duration) -> bool {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.age_at(now) > ttl_ms
    }
}

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error while preparing cache storage
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistent mirror could not be opened
    #[error("Cache mirror error: {0}")]
    Mirror(#[from] MirrorError),

    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Tile cache configuration.
///
/// All limits are fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCacheConfig {
    /// Maximum resident payload size in bytes (default: 50 MiB)
    pub capacity_bytes: u64,
    /// Tile time-to-live (default: 24 h)
    pub ttl: Duration,
    /// Expiry sweep interval; zero disables the background sweeper (default: 5 min)
    pub sweep_interval: Duration,
    /// Directory for the persistent mirror; `None` disables persistence
    pub mirror_dir: Option<PathBuf>,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            mirror_dir: None,
        }
    }
}

impl TileCacheConfig {
    /// Set capacity in bytes.
    pub fn with_capacity_bytes(mut self, bytes: u64) -> Self {
        self.capacity_bytes = bytes;
        self
    }

    /// Set capacity in MiB.
    pub fn with_capacity_mb(mut self, mb: u64) -> Self {
        self.capacity_bytes = mb.saturating_mul(1024 * 1024);
        self
    }

    /// Set the tile TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the tile TTL in hours.
    pub fn with_ttl_hours(mut self, hours: u64) -> Self {
        self.ttl = Duration::from_secs(hours.saturating_mul(60 * 60));
        self
    }

    /// Set the sweep interval. `Duration::ZERO` disables the sweeper.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the persistent mirror directory.
    pub fn with_mirror_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mirror_dir = Some(dir.into());
        self
    }

    /// Check limits before a store is built.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_starts_with_one_access() {
        let tile = CachedTile::new("https://a/1/2/3.png", Bytes::from_static(b"png"), 1_000);

        assert_eq!(tile.access_count, 1);
        assert_eq!(tile.timestamp, 1_000);
        assert_eq!(tile.last_accessed, 1_000);
        assert_eq!(tile.size(), 3);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut tile = CachedTile::new("u", Bytes::new(), 1_000);
        tile.touch(2_000);
        tile.touch(1_500);

        assert_eq!(tile.access_count, 3);
        assert_eq!(tile.last_accessed, 2_000);
        assert_eq!(tile.timestamp, 1_000, "Hits never move the write time");
    }

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let tile = CachedTile::new("u", Bytes::new(), 0);
        let ttl = Duration::from_millis(100);

        assert!(!tile.is_expired_at(99, ttl));
        assert!(!tile.is_expired_at(100, ttl));
        assert!(tile.is_expired_at(101, ttl));
    }

    #[test]
    fn test_config_defaults() {
        let config = TileCacheConfig::default();
        assert_eq!(config.capacity_bytes, 50 * 1024 * 1024);
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
        assert!(config.mirror_dir.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = TileCacheConfig::default()
            .with_capacity_mb(8)
            .with_ttl_hours(1)
            .with_sweep_interval(Duration::ZERO)
            .with_mirror_dir("/tmp/tiles");

        assert_eq!(config.capacity_bytes, 8 * 1024 * 1024);
        assert_eq!(config.ttl, Duration::from_secs(3_600));
        assert!(config.sweep_interval.is_zero());
        assert_eq!(config.mirror_dir, Some(PathBuf::from("/tmp/tiles")));
    }

    #[test]
    fn test_config_builder_saturates_huge_values() {
        let config = TileCacheConfig::default()
            .with_capacity_mb(u64::MAX)
            .with_ttl_hours(u64::MAX);

        assert_eq!(config.capacity_bytes, u64::MAX);
        assert_eq!(config.ttl, Duration::from_secs(u64::MAX));

        let tile = CachedTile::new("u", Bytes::from_static(b"x"), 0);
        assert!(!tile.is_expired_at(u64::MAX, config.ttl));
    }

    #[test]
    fn test_config_validation() {
        assert!(TileCacheConfig::default().validate().is_ok());
        assert!(matches!(
            TileCacheConfig::default().with_capacity_bytes(0).validate(),
            Err(CacheError::InvalidConfig(_))
        ));
        assert!(matches!(
            TileCacheConfig::default().with_ttl(Duration::ZERO).validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}

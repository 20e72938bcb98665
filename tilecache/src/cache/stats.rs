//! Cache statistics.

use std::fmt;

/// Point-in-time snapshot of the tile cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Resident payload bytes
    pub total_size: u64,
    /// Resident tile count
    pub tile_count: usize,
    /// `hits / (hits + misses)`, 0.0 before any request
    pub hit_rate: f64,
    /// Smallest write timestamp among resident tiles (0 when empty)
    pub oldest_tile: u64,
    /// Largest write timestamp among resident tiles (0 when empty)
    pub newest_tile: u64,
    pub hits: u64,
    pub misses: u64,
    /// Tiles evicted to make room
    pub evictions: u64,
    /// Tiles removed by the TTL sweep
    pub expired: u64,
}

impl CacheStats {
    /// Hit rate for the given counters.
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Total lookups served.
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles, {} bytes, hit rate {:.1}% ({} hits / {} misses), {} evicted, {} expired",
            self.tile_count,
            self.total_size,
            self.hit_rate * 100.0,
            self.hits,
            self.misses,
            self.evictions,
            self.expired
        )
    }
}

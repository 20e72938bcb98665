//! Retention scoring for capacity eviction.
//!
//! Each resident tile gets a score that rewards frequent hits and penalises
//! time since the last hit:
//!
//! ```text
//! score = access_count * 0.7 - (now - last_accessed) * 0.3
//! ```
//!
//! Tiles are evicted lowest score first. Idle time is measured in
//! milliseconds, so one extra hit outweighs a little over two milliseconds of
//! idleness.

use crate::cache::types::CachedTile;

/// Weight of the hit count.
pub const ACCESS_WEIGHT: f64 = 0.7;

/// Weight of the idle time in milliseconds.
pub const RECENCY_WEIGHT: f64 = 0.3;

/// Retention score of `tile` at time `now`. Higher is kept longer.
pub fn retention_score(tile: &CachedTile, now: u64) -> f64 {
    tile.access_count as f64 * ACCESS_WEIGHT - tile.idle_at(now) as f64 * RECENCY_WEIGHT
}

/// URLs of `tiles` in eviction order.
///
/// Ties fall back to the older `last_accessed`, then to URL order, so the
/// result does not depend on map iteration order.
pub fn eviction_order<'a, I>(tiles: I, now: u64) -> Vec<String>
where
    I: IntoIterator<Item = &'a CachedTile>,
{
    let mut ranked: Vec<(f64, u64, &str)> = tiles
        .into_iter()
        .map(|tile| {
            (
                retention_score(tile, now),
                tile.last_accessed,
                tile.url.as_str(),
            )
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(b.2))
    });

    ranked.into_iter().map(|(_, _, url)| url.to_string()).collect()
}

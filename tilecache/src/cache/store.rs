//! In-memory tile store with TTL expiry, capacity eviction and a
//! write-through persistent mirror.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::cache::eviction::eviction_order;
use crate::cache::mirror::{MirrorStats, MirrorWriter, TileMirror};
use crate::cache::stats::CacheStats;
use crate::cache::sweeper::SweepDaemon;
use crate::cache::types::{CacheError, CachedTile, TileCacheConfig};
use crate::time::Clock;

#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, CachedTile>,
    current_size: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expired: u64,
}

impl StoreState {
    fn insert(&mut self, tile: CachedTile) {
        self.current_size += tile.size();
        if let Some(previous) = self.entries.insert(tile.url.clone(), tile) {
            self.current_size = self.current_size.saturating_sub(previous.size());
        }
    }

    fn remove(&mut self, url: &str) -> Option<CachedTile> {
        let tile = self.entries.remove(url)?;
        self.current_size = self.current_size.saturating_sub(tile.size());
        Some(tile)
    }
}

/// Tile cache keyed by request URL.
///
/// All index mutations happen under one lock, so `get`, `put`,
/// `ensure_space`, `sweep_expired` and `clear` are atomic with respect to each
/// other. Mirror operations are queued while that lock is held, which keeps
/// the mirror's operation order identical to the index's.
///
/// # Example
///
/// ```
/// # #[tokio::main]
/// # async fn main() -> Result<(), tilecache::cache::CacheError> {
/// use std::sync::Arc;
/// use tilecache::cache::{NoOpMirror, TileCacheConfig, TileCacheStore};
/// use tilecache::time::SystemClock;
///
/// let store = TileCacheStore::open(
///     TileCacheConfig::default(),
///     Arc::new(NoOpMirror),
///     Arc::new(SystemClock),
/// )
/// .await?;
///
/// store.put("https://tile.example.com/3/4/2.png", vec![0u8; 128]);
/// assert!(store.get("https://tile.example.com/3/4/2.png").is_some());
///
/// store.dispose().await;
/// # Ok(())
/// # }
/// ```
pub struct TileCacheStore {
    config: TileCacheConfig,
    state: Mutex<StoreState>,
    writer: MirrorWriter,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl TileCacheStore {
    /// Open a store over `mirror`.
    ///
    /// Loads persisted tiles, drops those already past their TTL (deleting
    /// their records), trims to capacity, then starts the mirror writer and,
    /// unless the sweep interval is zero, the expiry sweeper. A mirror that
    /// fails to load is logged and the store starts empty.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(
        config: TileCacheConfig,
        mirror: Arc<dyn TileMirror>,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>, CacheError> {
        config.validate()?;

        let records = match mirror.load_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    backend = mirror.name(),
                    error = %e,
                    "Failed to load persisted tiles, starting empty"
                );
                Vec::new()
            }
        };

        let sweep_interval = config.sweep_interval;
        let store = Arc::new(Self {
            config,
            state: Mutex::new(StoreState::default()),
            writer: MirrorWriter::spawn(mirror),
            clock,
            shutdown: CancellationToken::new(),
            sweeper: Mutex::new(None),
            disposed: AtomicBool::new(false),
        });

        store.rehydrate(records);

        if !sweep_interval.is_zero() {
            let daemon = SweepDaemon::new(Arc::downgrade(&store), sweep_interval);
            let handle = tokio::spawn(daemon.run(store.shutdown.clone()));
            *store.sweeper.lock() = Some(handle);
        }

        info!(
            capacity_bytes = store.config.capacity_bytes,
            ttl_secs = store.config.ttl.as_secs(),
            backend = store.writer.backend(),
            "Tile cache opened"
        );

        Ok(store)
    }

    fn rehydrate(&self, records: Vec<CachedTile>) {
        if records.is_empty() {
            return;
        }

        let now = self.clock.now_millis();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut restored = 0usize;
        let mut discarded = 0usize;
        for tile in records {
            if tile.is_expired_at(now, self.config.ttl) {
                self.writer.delete(tile.url);
                discarded += 1;
            } else {
                state.insert(tile);
                restored += 1;
            }
        }

        let evicted = self.evict_locked(state, 0, now);
        drop(guard);

        info!(restored, discarded, evicted, "Tile cache rehydrated");
    }

    /// Look up a tile, recording a hit or a miss.
    ///
    /// Hits bump the tile's access count and last-access time. Expiry is left
    /// to [`sweep_expired`](Self::sweep_expired): an entry past its TTL is
    /// still served until the next sweep.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        let now = self.clock.now_millis();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        match state.entries.get_mut(url) {
            Some(tile) => {
                tile.touch(now);
                state.hits += 1;
                trace!(url, access_count = tile.access_count, "Tile cache hit");
                Some(tile.data.clone())
            }
            None => {
                state.misses += 1;
                trace!(url, "Tile cache miss");
                None
            }
        }
    }

    /// Presence check that leaves counters and recency untouched.
    pub fn contains(&self, url: &str) -> bool {
        self.state.lock().entries.contains_key(url)
    }

    /// Copy of the entry for `url` without recording an access.
    pub fn peek(&self, url: &str) -> Option<CachedTile> {
        self.state.lock().entries.get(url).cloned()
    }

    /// Insert or replace a tile, evicting as needed, and queue a mirror write.
    ///
    /// A tile larger than the whole capacity empties the store and is then
    /// inserted on its own.
    pub fn put(&self, url: impl Into<String>, data: impl Into<Bytes>) {
        let now = self.clock.now_millis();
        let tile = CachedTile::new(url, data.into(), now);
        let size = tile.size();

        if size > self.config.capacity_bytes {
            warn!(
                url = %tile.url,
                size,
                capacity = self.config.capacity_bytes,
                "Tile exceeds cache capacity"
            );
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        // Release the bytes of a replaced entry before sizing the new one
        state.remove(&tile.url);
        self.evict_locked(state, size, now);

        self.writer.store(tile.clone());
        debug!(url = %tile.url, size, "Tile cached");
        state.insert(tile);
    }

    /// Evict until `additional` more bytes fit within capacity.
    ///
    /// Returns the number of tiles evicted.
    pub fn ensure_space(&self, additional: u64) -> usize {
        let now = self.clock.now_millis();
        let mut guard = self.state.lock();
        self.evict_locked(&mut guard, additional, now)
    }

    fn evict_locked(&self, state: &mut StoreState, additional: u64, now: u64) -> usize {
        let capacity = self.config.capacity_bytes;
        if state.current_size + additional <= capacity {
            return 0;
        }

        let mut evicted = 0usize;
        let mut freed = 0u64;
        for url in eviction_order(state.entries.values(), now) {
            if state.current_size + additional <= capacity {
                break;
            }
            if let Some(tile) = state.remove(&url) {
                freed += tile.size();
                evicted += 1;
                state.evictions += 1;
                self.writer.delete(url);
            }
        }

        debug!(
            evicted,
            freed_bytes = freed,
            size = state.current_size,
            capacity,
            "Evicted tiles to make room"
        );
        evicted
    }

    /// Remove every tile whose age exceeds the TTL, from memory and mirror.
    ///
    /// Returns the number of tiles removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let ttl = self.config.ttl;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let expired: Vec<String> = state
            .entries
            .values()
            .filter(|tile| tile.is_expired_at(now, ttl))
            .map(|tile| tile.url.clone())
            .collect();

        for url in &expired {
            state.remove(url);
            state.expired += 1;
            self.writer.delete(url.clone());
        }
        let remaining = state.entries.len();
        drop(guard);

        if expired.is_empty() {
            debug!(remaining, "Tile cache sweep found nothing to expire");
        } else {
            info!(removed = expired.len(), remaining, "Swept expired tiles");
        }
        expired.len()
    }

    /// Snapshot of size, count, hit rate and age range.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();

        let (oldest_tile, newest_tile) = state
            .entries
            .values()
            .map(|tile| tile.timestamp)
            .fold(None, |range, ts| match range {
                None => Some((ts, ts)),
                Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
            })
            .unwrap_or((0, 0));

        CacheStats {
            total_size: state.current_size,
            tile_count: state.entries.len(),
            hit_rate: CacheStats::compute_hit_rate(state.hits, state.misses),
            oldest_tile,
            newest_tile,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            expired: state.expired,
        }
    }

    /// Drop every tile from memory and mirror and reset hit/miss counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.current_size = 0;
        state.hits = 0;
        state.misses = 0;
        self.writer.clear();
        drop(state);

        info!(removed, "Tile cache cleared");
    }

    /// Wait for all queued mirror operations to be applied.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Stop the sweeper, drain the mirror writer and shut it down.
    ///
    /// Safe to call more than once. Later `put`s still update memory but are
    /// no longer persisted.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shutdown.cancel();
        let sweeper = self.sweeper.lock().take();
        if let Some(handle) = sweeper {
            if let Err(e) = handle.await {
                warn!(error = %e, "Tile cache sweeper task failed");
            }
        }

        self.writer.shutdown().await;
        info!("Tile cache disposed");
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Resident payload bytes.
    pub fn size_bytes(&self) -> u64 {
        self.state.lock().current_size
    }

    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }

    /// Counters for the persistent mirror.
    pub fn mirror_stats(&self) -> &MirrorStats {
        self.writer.stats()
    }
}

impl Drop for TileCacheStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::mirror::{BoxFuture, MemoryMirror, MirrorError, NoOpMirror, TileMirror};
    use crate::time::ManualClock;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    /// Mirror whose every operation fails.
    struct BrokenMirror;

    fn broken() -> MirrorError {
        std::io::Error::other("mirror unavailable").into()
    }

    impl TileMirror for BrokenMirror {
        fn load_all(&self) -> BoxFuture<'_, Result<Vec<CachedTile>, MirrorError>> {
            Box::pin(async { Err(broken()) })
        }

        fn store(&self, _tile: CachedTile) -> BoxFuture<'_, Result<(), MirrorError>> {
            Box::pin(async { Err(broken()) })
        }

        fn delete<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<(), MirrorError>> {
            Box::pin(async { Err(broken()) })
        }

        fn clear(&self) -> BoxFuture<'_, Result<(), MirrorError>> {
            Box::pin(async { Err(broken()) })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn config(capacity: u64) -> TileCacheConfig {
        TileCacheConfig::default()
            .with_capacity_bytes(capacity)
            .with_ttl(TTL)
            .with_sweep_interval(Duration::ZERO)
    }

    async fn open_store(
        capacity: u64,
        mirror: MemoryMirror,
        clock: Arc<ManualClock>,
    ) -> Arc<TileCacheStore> {
        TileCacheStore::open(config(capacity), Arc::new(mirror), clock)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let result = TileCacheStore::open(
            config(0),
            Arc::new(NoOpMirror),
            Arc::new(ManualClock::new(0)),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_get_miss_then_hit() {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = open_store(1024, MemoryMirror::new(), clock.clone()).await;

        assert!(store.get("a").is_none());

        store.put("a", vec![7u8; 10]);
        clock.advance(Duration::from_millis(500));
        let data = store.get("a").unwrap();

        assert_eq!(data.len(), 10);
        let tile = store.peek("a").unwrap();
        assert_eq!(tile.access_count, 2);
        assert_eq!(tile.last_accessed, 1_500);
        assert_eq!(tile.timestamp, 1_000);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[tokio::test]
    async fn test_contains_has_no_side_effects() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(1024, MemoryMirror::new(), clock).await;
        store.put("a", vec![0u8; 4]);

        assert!(store.contains("a"));
        assert!(!store.contains("b"));

        let stats = store.stats();
        assert_eq!(stats.hits + stats.misses, 0);
        assert_eq!(store.peek("a").unwrap().access_count, 1);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(100, MemoryMirror::new(), clock.clone()).await;

        store.put("a", vec![0u8; 60]);
        store.get("a");
        clock.advance(Duration::from_millis(10));
        store.put("a", vec![1u8; 80]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.size_bytes(), 80);
        let tile = store.peek("a").unwrap();
        assert_eq!(tile.access_count, 1);
        assert_eq!(tile.timestamp, 10);
        assert_eq!(store.stats().evictions, 0, "Replacing must not evict itself");
    }

    #[tokio::test]
    async fn test_put_evicts_least_valuable() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(300, MemoryMirror::new(), clock.clone()).await;

        store.put("old", vec![0u8; 100]);
        clock.advance(Duration::from_millis(10));
        store.put("mid", vec![0u8; 100]);
        clock.advance(Duration::from_millis(10));
        store.put("new", vec![0u8; 100]);
        clock.advance(Duration::from_millis(10));

        store.put("next", vec![0u8; 100]);

        assert!(!store.contains("old"));
        assert!(store.contains("mid"));
        assert!(store.contains("new"));
        assert!(store.contains("next"));
        assert_eq!(store.size_bytes(), 300);
        assert_eq!(store.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_frequent_hits_survive_eviction() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(200, MemoryMirror::new(), clock.clone()).await;

        store.put("popular", vec![0u8; 100]);
        for _ in 0..20 {
            store.get("popular");
        }
        clock.advance(Duration::from_millis(5));
        store.put("fresh", vec![0u8; 100]);
        clock.advance(Duration::from_millis(1));

        store.put("incoming", vec![0u8; 100]);

        assert!(store.contains("popular"));
        assert!(!store.contains("fresh"));
    }

    #[tokio::test]
    async fn test_oversized_tile_empties_store() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(100, MemoryMirror::new(), clock).await;

        store.put("a", vec![0u8; 40]);
        store.put("b", vec![0u8; 40]);
        store.put("huge", vec![0u8; 250]);

        assert_eq!(store.len(), 1);
        assert!(store.contains("huge"));
        assert_eq!(store.size_bytes(), 250);
    }

    #[tokio::test]
    async fn test_ensure_space_noop_when_fits() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(100, MemoryMirror::new(), clock).await;
        store.put("a", vec![0u8; 50]);

        assert_eq!(store.ensure_space(50), 0);
        assert_eq!(store.ensure_space(51), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_eviction_deletes_from_mirror() {
        let clock = Arc::new(ManualClock::new(0));
        let mirror = MemoryMirror::new();
        let store = open_store(100, mirror.clone(), clock.clone()).await;

        store.put("a", vec![0u8; 60]);
        clock.advance(Duration::from_millis(1));
        store.put("b", vec![0u8; 60]);
        store.flush().await;

        assert!(!mirror.contains("a"));
        assert!(mirror.contains("b"));
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let mirror = MemoryMirror::new();
        let store = open_store(1024, mirror.clone(), clock.clone()).await;

        store.put("old", vec![0u8; 10]);
        clock.advance(TTL / 2);
        store.put("young", vec![0u8; 10]);
        clock.advance(TTL / 2 + Duration::from_millis(1));

        assert_eq!(store.sweep_expired(), 1);
        store.flush().await;

        assert!(!store.contains("old"));
        assert!(store.contains("young"));
        assert!(!mirror.contains("old"));
        assert_eq!(store.stats().expired, 1);
        assert_eq!(store.sweep_expired(), 0);
    }

    #[tokio::test]
    async fn test_get_does_not_check_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let store = open_store(1024, MemoryMirror::new(), clock.clone()).await;

        store.put("a", vec![0u8; 10]);
        clock.advance(TTL * 2);

        assert!(store.get("a").is_some());
    }

    #[tokio::test]
    async fn test_clear_resets_memory_mirror_and_counters() {
        let clock = Arc::new(ManualClock::new(0));
        let mirror = MemoryMirror::new();
        let store = open_store(1024, mirror.clone(), clock).await;

        store.put("a", vec![0u8; 10]);
        store.get("a");
        store.get("missing");
        store.clear();
        store.flush().await;

        let stats = store.stats();
        assert_eq!(stats.tile_count, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate, 0.0);
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_stats_age_range() {
        let clock = Arc::new(ManualClock::new(5_000));
        let store = open_store(1024, MemoryMirror::new(), clock.clone()).await;

        assert_eq!(store.stats().oldest_tile, 0);
        assert_eq!(store.stats().newest_tile, 0);

        store.put("a", vec![0u8; 1]);
        clock.advance(Duration::from_millis(250));
        store.put("b", vec![0u8; 2]);

        let stats = store.stats();
        assert_eq!(stats.oldest_tile, 5_000);
        assert_eq!(stats.newest_tile, 5_250);
        assert_eq!(stats.total_size, 3);
        assert_eq!(stats.tile_count, 2);
    }

    #[tokio::test]
    async fn test_rehydrate_discards_expired_records() {
        let clock = Arc::new(ManualClock::new(0));
        let ttl_ms = TTL.as_millis() as u64;
        let fresh = CachedTile::new("fresh", Bytes::from_static(b"ok"), 2 * ttl_ms);
        let stale = CachedTile::new("stale", Bytes::from_static(b"old"), 0);
        let mirror = MemoryMirror::with_tiles([fresh.clone(), stale]);

        clock.set(2 * ttl_ms + 10);
        let store = open_store(1024, mirror.clone(), clock).await;
        store.flush().await;

        assert_eq!(store.peek("fresh"), Some(fresh));
        assert!(!store.contains("stale"));
        assert!(!mirror.contains("stale"));
        assert_eq!(store.size_bytes(), 2);
    }

    #[tokio::test]
    async fn test_rehydrate_trims_to_capacity() {
        let clock = Arc::new(ManualClock::new(100));
        let mirror = MemoryMirror::with_tiles(
            (0..5).map(|i| CachedTile::new(format!("t{i}"), Bytes::from(vec![0u8; 40]), i * 10)),
        );

        let store = open_store(100, mirror.clone(), clock).await;
        store.flush().await;

        assert_eq!(store.len(), 2);
        assert!(store.contains("t3"));
        assert!(store.contains("t4"));
        assert_eq!(mirror.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweeper_expires_tiles() {
        let clock = Arc::new(ManualClock::new(0));
        let config = config(1024).with_sweep_interval(Duration::from_secs(30));
        let store = TileCacheStore::open(config, Arc::new(NoOpMirror), clock.clone())
            .await
            .unwrap();

        store.put("a", vec![0u8; 10]);
        clock.advance(TTL + Duration::from_millis(1));

        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(store.is_empty());
        store.dispose().await;
    }

    #[tokio::test]
    async fn test_dispose_is_idempotent() {
        let clock = Arc::new(ManualClock::new(0));
        let mirror = MemoryMirror::new();
        let store = TileCacheStore::open(
            config(1024).with_sweep_interval(Duration::from_secs(1)),
            Arc::new(mirror.clone()),
            clock,
        )
        .await
        .unwrap();

        store.put("a", vec![0u8; 10]);
        store.dispose().await;
        store.dispose().await;

        assert!(mirror.contains("a"), "Dispose drains pending writes");
    }

    #[tokio::test]
    async fn test_open_starts_empty_when_mirror_load_fails() {
        let store = TileCacheStore::open(
            config(1024),
            Arc::new(BrokenMirror),
            Arc::new(ManualClock::new(0)),
        )
        .await
        .unwrap();

        assert!(store.is_empty());

        store.put("a", vec![1u8; 8]);
        assert_eq!(store.get("a").map(|data| data.len()), Some(8));
        store.dispose().await;
    }

    #[tokio::test]
    async fn test_mirror_failures_leave_memory_and_stats_intact() {
        let clock = Arc::new(ManualClock::new(0));
        let store = TileCacheStore::open(config(100), Arc::new(BrokenMirror), clock.clone())
            .await
            .unwrap();

        store.put("a", vec![0u8; 40]);
        clock.advance(Duration::from_millis(10));
        store.put("b", vec![0u8; 40]);
        clock.advance(Duration::from_millis(10));
        store.put("c", vec![0u8; 40]);

        assert!(!store.contains("a"));
        assert!(store.contains("b"));
        assert!(store.contains("c"));

        // b is past the TTL, c is not
        clock.set(TTL.as_millis() as u64 + 15);
        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.get("c").map(|data| data.len()), Some(40));

        store.flush().await;

        let stats = store.stats();
        assert_eq!(stats.tile_count, 1);
        assert_eq!(stats.total_size, 40);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);

        // Three failed writes, one failed eviction delete, one failed sweep delete
        assert_eq!(store.mirror_stats().failures(), 5);
        assert_eq!(store.mirror_stats().writes(), 0);
        store.dispose().await;
    }
}

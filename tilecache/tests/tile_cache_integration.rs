//! Integration tests for the tile cache.
//!
//! These tests drive the public API end to end:
//! - Key uniqueness, TTL expiry and capacity eviction in the store
//! - Recency preference of the retention score
//! - Hit-rate accounting
//! - Rehydration from memory and disk mirrors after a restart
//! - Region preload coverage through the service facade

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tempfile::TempDir;
use tilecache::cache::{DiskMirror, MemoryMirror, TileCacheConfig, TileCacheStore, TileMirror};
use tilecache::coord::{lat_to_tile_y, lon_to_tile_x, GeoBounds};
use tilecache::fetch::UrlTemplate;
use tilecache::preload::PreloadConfig;
use tilecache::provider::{AsyncHttpClient, FetchError};
use tilecache::service::{ServiceConfig, TileCacheService};
use tilecache::time::{Clock, ManualClock};

// =============================================================================
// Test Helpers
// =============================================================================

const HOUR: Duration = Duration::from_secs(3600);
const TEMPLATE: &str = "https://tiles.test/{z}/{x}/{y}.png";

/// HTTP client that answers every URL with its own bytes and records calls.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<String>>,
}

impl RecordingClient {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl AsyncHttpClient for RecordingClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.lock().push(url.to_string());
        Ok(Bytes::from(url.as_bytes().to_vec()))
    }
}

fn store_config(capacity: u64, ttl: Duration) -> TileCacheConfig {
    TileCacheConfig::default()
        .with_capacity_bytes(capacity)
        .with_ttl(ttl)
        .with_sweep_interval(Duration::ZERO)
}

async fn open_store(
    config: TileCacheConfig,
    mirror: Arc<dyn TileMirror>,
    clock: &Arc<ManualClock>,
) -> Arc<TileCacheStore> {
    let clock: Arc<dyn Clock> = clock.clone();
    TileCacheStore::open(config, mirror, clock).await.unwrap()
}

async fn memory_store(config: TileCacheConfig, clock: &Arc<ManualClock>) -> Arc<TileCacheStore> {
    open_store(config, Arc::new(MemoryMirror::new()), clock).await
}

async fn recording_service(
    clock: &Arc<ManualClock>,
) -> (TileCacheService<Arc<RecordingClient>>, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let config = ServiceConfig::default()
        .with_cache(store_config(10 * 1024 * 1024, HOUR))
        .with_preload(PreloadConfig::default().with_batch_delay(Duration::ZERO));
    let clock: Arc<dyn Clock> = clock.clone();

    let service = TileCacheService::with_client(
        config,
        Arc::new(MemoryMirror::new()),
        Arc::clone(&client),
        clock,
    )
    .await
    .unwrap();

    (service, client)
}

// =============================================================================
// Store Properties
// =============================================================================

#[tokio::test]
async fn test_put_same_url_replaces_payload() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(1024, HOUR), &clock).await;

    store.put("u", Bytes::from_static(b"first"));
    store.put("u", Bytes::from_static(b"second!"));

    assert_eq!(store.get("u"), Some(Bytes::from_static(b"second!")));
    assert_eq!(store.len(), 1);
    assert_eq!(store.size_bytes(), 7);
}

#[tokio::test]
async fn test_ttl_expiry_is_applied_by_sweep() {
    let clock = Arc::new(ManualClock::new(1_000));
    let store = memory_store(store_config(1024, HOUR), &clock).await;

    store.put("u", Bytes::from_static(b"tile"));

    clock.advance(HOUR - Duration::from_millis(1));
    assert!(store.get("u").is_some());
    assert_eq!(store.sweep_expired(), 0);

    clock.advance(Duration::from_millis(2));
    assert_eq!(store.sweep_expired(), 1);
    assert!(store.peek("u").is_none());
    assert_eq!(store.stats().expired, 1);
}

#[tokio::test]
async fn test_capacity_eviction_keeps_size_within_bounds() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(100, HOUR), &clock).await;

    for url in ["a", "b", "c"] {
        clock.advance(Duration::from_millis(10));
        store.put(url, vec![0u8; 50]);
        assert!(store.size_bytes() <= 100);
    }

    assert_eq!(store.len(), 2);
    assert!(store.stats().evictions >= 1);
}

#[tokio::test]
async fn test_older_tile_evicted_first_on_equal_access_count() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(8, HOUR), &clock).await;

    store.put("older", Bytes::from_static(b"1234"));
    clock.advance(Duration::from_millis(10));
    store.put("newer", Bytes::from_static(b"5678"));
    clock.advance(Duration::from_millis(10));

    store.put("third", Bytes::from_static(b"9abc"));

    assert!(!store.contains("older"));
    assert!(store.contains("newer"));
    assert!(store.contains("third"));
}

#[tokio::test]
async fn test_hit_rate_after_clear() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(1024, HOUR), &clock).await;

    store.put("stale", Bytes::from_static(b"x"));
    assert!(store.get("stale").is_some());
    store.clear();

    let urls = ["a", "b", "c"];
    for url in urls {
        assert!(store.get(url).is_none());
        store.put(url, Bytes::from_static(b"t"));
    }
    for url in urls.iter().chain(urls.iter()).take(5) {
        assert!(store.get(url).is_some());
    }

    let stats = store.stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 5);
    assert!((stats.hit_rate - 5.0 / 8.0).abs() < f64::EPSILON);
}

// =============================================================================
// Rehydration
// =============================================================================

#[tokio::test]
async fn test_rehydration_restores_only_live_tiles() {
    let clock = Arc::new(ManualClock::new(0));
    let mirror = MemoryMirror::new();
    let config = store_config(1024, 2 * HOUR);

    let store = open_store(config.clone(), Arc::new(mirror.clone()), &clock).await;
    store.put("early", Bytes::from_static(b"early-bytes"));
    clock.advance(HOUR);
    store.put("late", Bytes::from_static(b"late-bytes"));
    store.dispose().await;
    drop(store);
    assert_eq!(mirror.len(), 2);

    // "early" is now 2h30m old, "late" 1h30m.
    clock.advance(HOUR + HOUR / 2);
    let restarted = open_store(config, Arc::new(mirror.clone()), &clock).await;

    assert!(restarted.peek("early").is_none());
    let late = restarted.peek("late").unwrap();
    assert_eq!(late.data, Bytes::from_static(b"late-bytes"));
    assert_eq!(late.timestamp, HOUR.as_millis() as u64);

    restarted.flush().await;
    assert!(!mirror.contains("early"));
    assert!(mirror.contains("late"));
}

#[tokio::test]
async fn test_rehydration_from_disk_mirror() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let config = store_config(1024, HOUR);

    let mirror = DiskMirror::open(temp_dir.path()).await.unwrap();
    let store = open_store(config.clone(), Arc::new(mirror), &clock).await;
    store.put("https://t/1/0/0.png", Bytes::from_static(&[0x89, b'P', b'N', b'G']));
    store.put("https://t/1/1/0.png", Bytes::from_static(&[1, 2, 3]));
    assert!(store.get("https://t/1/1/0.png").is_some());
    store.dispose().await;
    drop(store);

    let mirror = DiskMirror::open(temp_dir.path()).await.unwrap();
    let restarted = open_store(config, Arc::new(mirror), &clock).await;

    assert_eq!(restarted.len(), 2);
    assert_eq!(
        restarted.peek("https://t/1/0/0.png").unwrap().data,
        Bytes::from_static(&[0x89, b'P', b'N', b'G'])
    );
    assert_eq!(
        restarted.peek("https://t/1/1/0.png").unwrap().data,
        Bytes::from_static(&[1, 2, 3])
    );
    restarted.dispose().await;
}

// =============================================================================
// Preload Coverage
// =============================================================================

#[tokio::test]
async fn test_preload_fetches_each_covering_tile_once() {
    let clock = Arc::new(ManualClock::new(0));
    let (service, client) = recording_service(&clock).await;
    let template = UrlTemplate::new(TEMPLATE).unwrap();
    let bounds = GeoBounds::new(60.0, -10.0, -10.0, -170.0).unwrap();

    let x_range = lon_to_tile_x(-170.0, 2)..=lon_to_tile_x(-10.0, 2);
    let y_range = lat_to_tile_y(60.0, 2)..=lat_to_tile_y(-10.0, 2);
    let expected = x_range.clone().count() * y_range.clone().count();
    assert_eq!(expected, 4);

    // One tile is already cached and must not be fetched again.
    let cached = format!("https://tiles.test/2/{}/{}.png", x_range.start(), y_range.start());
    service.store().put(cached.clone(), Bytes::from_static(b"cached"));

    let report = service.preload(&bounds, &[2, 2], &template).await;

    assert_eq!(report.requested, expected);
    assert_eq!(report.skipped_cached, 1);
    assert_eq!(report.fetched, expected - 1);
    assert_eq!(report.failed, 0);

    let calls = client.calls();
    let distinct: HashSet<&String> = calls.iter().collect();
    assert_eq!(calls.len(), expected - 1);
    assert_eq!(distinct.len(), calls.len());
    assert!(!calls.contains(&cached));

    for x in x_range {
        for y in y_range.clone() {
            assert!(service
                .store()
                .contains(&format!("https://tiles.test/2/{x}/{y}.png")));
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_scenario_single_tile_capacity() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(1, HOUR), &clock).await;

    store.put("A", Bytes::from_static(b"a"));
    clock.advance(Duration::from_millis(1));
    store.put("B", Bytes::from_static(b"b"));

    assert!(store.get("A").is_none());
    assert_eq!(store.get("B"), Some(Bytes::from_static(b"b")));
}

#[tokio::test]
async fn test_scenario_sweep_empties_store() {
    let clock = Arc::new(ManualClock::new(0));
    let store = memory_store(store_config(1024, HOUR), &clock).await;

    store.put("tile", Bytes::from_static(b"t"));
    clock.set(HOUR.as_millis() as u64 + 1);

    assert_eq!(store.sweep_expired(), 1);
    let stats = store.stats();
    assert_eq!(stats.tile_count, 0);
    assert_eq!(stats.total_size, 0);
}

#[tokio::test]
async fn test_scenario_world_tile_at_zoom_zero() {
    let clock = Arc::new(ManualClock::new(0));
    let (service, client) = recording_service(&clock).await;
    let template = UrlTemplate::new(TEMPLATE).unwrap();
    let bounds = GeoBounds::new(1.0, 0.0, 1.0, 0.0).unwrap();

    let report = service.preload(&bounds, &[0], &template).await;

    assert_eq!(report.requested, 1);
    assert_eq!(client.calls(), vec!["https://tiles.test/0/0/0.png".to_string()]);
}

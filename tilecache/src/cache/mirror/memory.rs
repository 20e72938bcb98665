//! In-process mirrors.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BoxFuture, MirrorError, TileMirror};
use crate::cache::types::CachedTile;

/// Mirror backed by a shared in-memory map.
///
/// Clones share the same map, so a test can keep a handle, drop the store,
/// and open a new store over the same records to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    records: Arc<Mutex<HashMap<String, CachedTile>>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror pre-populated with `tiles`.
    pub fn with_tiles(tiles: impl IntoIterator<Item = CachedTile>) -> Self {
        let records = tiles.into_iter().map(|t| (t.url.clone(), t)).collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.lock().contains_key(url)
    }

    /// Copy of the record for `url`.
    pub fn get(&self, url: &str) -> Option<CachedTile> {
        self.records.lock().get(url).cloned()
    }
}

impl TileMirror for MemoryMirror {
    fn load_all(&self) -> BoxFuture<'_, Result<Vec<CachedTile>, MirrorError>> {
        let tiles: Vec<CachedTile> = self.records.lock().values().cloned().collect();
        Box::pin(async move { Ok(tiles) })
    }

    fn store(&self, tile: CachedTile) -> BoxFuture<'_, Result<(), MirrorError>> {
        self.records.lock().insert(tile.url.clone(), tile);
        Box::pin(async { Ok(()) })
    }

    fn delete<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), MirrorError>> {
        self.records.lock().remove(url);
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), MirrorError>> {
        self.records.lock().clear();
        Box::pin(async { Ok(()) })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Mirror that persists nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMirror;

impl TileMirror for NoOpMirror {
    fn load_all(&self) -> BoxFuture<'_, Result<Vec<CachedTile>, MirrorError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn store(&self, _tile: CachedTile) -> BoxFuture<'_, Result<(), MirrorError>> {
        Box::pin(async { Ok(()) })
    }

    fn delete<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<(), MirrorError>> {
        Box::pin(async { Ok(()) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), MirrorError>> {
        Box::pin(async { Ok(()) })
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_memory_mirror_shares_records_between_clones() {
        let mirror = MemoryMirror::new();
        let handle = mirror.clone();

        mirror
            .store(CachedTile::new("a", Bytes::from_static(b"1"), 0))
            .await
            .unwrap();

        assert!(handle.contains("a"));
        assert_eq!(handle.load_all().await.unwrap().len(), 1);

        handle.delete("a").await.unwrap();
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_memory_mirror_prepopulated() {
        let mirror = MemoryMirror::with_tiles([
            CachedTile::new("a", Bytes::new(), 0),
            CachedTile::new("b", Bytes::new(), 0),
        ]);
        assert_eq!(mirror.len(), 2);

        mirror.clear().await.unwrap();
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_noop_mirror_loads_nothing() {
        let mirror = NoOpMirror;
        mirror
            .store(CachedTile::new("a", Bytes::new(), 0))
            .await
            .unwrap();
        assert!(mirror.load_all().await.unwrap().is_empty());
        assert_eq!(mirror.name(), "none");
    }
}

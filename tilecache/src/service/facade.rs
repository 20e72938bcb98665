//! Tile cache service facade implementation.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::cache::{CacheStats, DiskMirror, MirrorError, NoOpMirror, TileCacheStore, TileMirror};
use crate::coord::{GeoBounds, TileCoord};
use crate::fetch::{TileFetcher, UrlTemplate};
use crate::preload::{PreloadReport, RegionPreloader};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, FetchError};
use crate::time::{Clock, SystemClock};

/// High-level facade over the tile store, fetcher and preloader.
///
/// Built once at process start and shared by `Arc` with whatever renders
/// the map. Encapsulates component wiring so callers only deal with URLs,
/// coordinates and regions.
///
/// # Example
///
/// ```no_run
/// use tilecache::service::{ServiceConfig, TileCacheService};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TileCacheService::start(ServiceConfig::default()).await?;
/// let tile = service
///     .load_tile("https://tile.openstreetmap.org/0/0/0.png")
///     .await?;
/// println!("{} bytes", tile.len());
/// service.dispose().await;
/// # Ok(())
/// # }
/// ```
pub struct TileCacheService<C = AsyncReqwestClient> {
    config: ServiceConfig,
    store: Arc<TileCacheStore>,
    fetcher: Arc<TileFetcher<C>>,
    preloader: Arc<RegionPreloader<C>>,
}

impl TileCacheService<AsyncReqwestClient> {
    /// Start the service with the reqwest client and the wall clock.
    ///
    /// Uses a [`DiskMirror`] when `config.cache.mirror_dir` is set. A mirror
    /// written by a newer release is left untouched and the service runs
    /// without persistence; any other mirror failure is returned.
    ///
    /// # Errors
    ///
    /// Fails if the mirror directory cannot be prepared, the HTTP client
    /// cannot be built, or the cache configuration is invalid.
    pub async fn start(config: ServiceConfig) -> Result<Self, ServiceError> {
        let mirror = open_mirror(config.cache.mirror_dir.as_deref()).await?;
        let client = AsyncReqwestClient::with_config(&config.http)?;
        Self::with_client(config, mirror, client, Arc::new(SystemClock)).await
    }
}

impl<C: AsyncHttpClient + 'static> TileCacheService<C> {
    /// Wire the service from explicit components.
    pub async fn with_client(
        config: ServiceConfig,
        mirror: Arc<dyn TileMirror>,
        client: C,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        let store = TileCacheStore::open(config.cache.clone(), mirror, clock).await?;
        let fetcher = Arc::new(TileFetcher::new(Arc::clone(&store), client));
        let preloader = Arc::new(RegionPreloader::new(
            Arc::clone(&fetcher),
            config.preload.clone(),
        ));

        Ok(Self {
            config,
            store,
            fetcher,
            preloader,
        })
    }

    /// Return the tile at `url`, downloading and caching it on a miss.
    pub async fn load_tile(&self, url: &str) -> Result<Bytes, FetchError> {
        self.fetcher.load_tile(url).await
    }

    /// Return the tile at `coord` as addressed by `template`.
    pub async fn load_coord(
        &self,
        template: &UrlTemplate,
        coord: &TileCoord,
    ) -> Result<Bytes, FetchError> {
        self.fetcher.load_coord(template, coord).await
    }

    /// Cache every tile of `bounds` at each zoom level.
    pub async fn preload(
        &self,
        bounds: &GeoBounds,
        zoom_levels: &[u8],
        template: &UrlTemplate,
    ) -> PreloadReport {
        self.preloader.preload(bounds, zoom_levels, template).await
    }

    /// Run a preload on a background task.
    pub fn spawn_preload(
        &self,
        bounds: GeoBounds,
        zoom_levels: Vec<u8>,
        template: UrlTemplate,
    ) -> JoinHandle<PreloadReport> {
        self.preloader.spawn(bounds, zoom_levels, template)
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Remove expired tiles now. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        self.store.sweep_expired()
    }

    /// Wait until queued mirror writes have been applied.
    pub async fn flush(&self) {
        self.store.flush().await
    }

    /// Stop background work and drain pending mirror writes.
    pub async fn dispose(&self) {
        self.store.dispose().await
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<TileCacheStore> {
        &self.store
    }

    pub fn fetcher(&self) -> &Arc<TileFetcher<C>> {
        &self.fetcher
    }

    pub fn preloader(&self) -> &Arc<RegionPreloader<C>> {
        &self.preloader
    }
}

/// Open the configured mirror backend.
async fn open_mirror(directory: Option<&Path>) -> Result<Arc<dyn TileMirror>, ServiceError> {
    let Some(directory) = directory else {
        info!("Tile persistence disabled");
        return Ok(Arc::new(NoOpMirror));
    };

    match DiskMirror::open(directory).await {
        Ok(mirror) => {
            info!(directory = %directory.display(), "Tile persistence enabled");
            Ok(Arc::new(mirror))
        }
        Err(e @ MirrorError::Schema { .. }) => {
            warn!(
                directory = %directory.display(),
                error = %e,
                "Tile mirror is from a newer release, running without persistence"
            );
            Ok(Arc::new(NoOpMirror))
        }
        Err(e) => Err(e.into()),
    }
}

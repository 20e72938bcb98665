//! Cache-first tile loading.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cache::TileCacheStore;
use crate::coord::{TileCoord, MAX_ZOOM};
use crate::fetch::template::UrlTemplate;
use crate::provider::{AsyncHttpClient, FetchError};

/// Resolves tile URLs through the cache, falling back to the network.
///
/// There are no retries and no timeout beyond the HTTP client's own; a
/// failed request surfaces to the caller as a [`FetchError`].
pub struct TileFetcher<C> {
    store: Arc<TileCacheStore>,
    client: C,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    pub fn new(store: Arc<TileCacheStore>, client: C) -> Self {
        Self { store, client }
    }

    /// Return the tile at `url`, from cache if present.
    ///
    /// On a miss the tile is downloaded and written to the store before it is
    /// returned. Errors are logged and propagated; nothing is cached for a
    /// failed request.
    pub async fn load_tile(&self, url: &str) -> Result<Bytes, FetchError> {
        if let Some(data) = self.store.get(url) {
            debug!(url, bytes = data.len(), "Serving tile from cache");
            return Ok(data);
        }

        self.fetch_and_store(url).await
    }

    /// Load the tile for `coord` using `template`.
    ///
    /// Coordinates above [`MAX_ZOOM`] are rejected without touching the
    /// cache or the network.
    pub async fn load_coord(
        &self,
        template: &UrlTemplate,
        coord: &TileCoord,
    ) -> Result<Bytes, FetchError> {
        if coord.zoom > MAX_ZOOM {
            return Err(FetchError::UnsupportedZoom {
                coord: *coord,
                max_zoom: MAX_ZOOM,
            });
        }

        let url = template.expand(coord);
        self.load_tile(&url).await
    }

    /// Download `url` and cache it, skipping the cache lookup.
    pub async fn fetch_and_store(&self, url: &str) -> Result<Bytes, FetchError> {
        match self.client.get(url).await {
            Ok(data) => {
                debug!(url, bytes = data.len(), "Fetched tile from network");
                self.store.put(url, data.clone());
                Ok(data)
            }
            Err(e) => {
                warn!(url, error = %e, "Tile fetch failed");
                Err(e)
            }
        }
    }

    pub fn store(&self) -> &Arc<TileCacheStore> {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

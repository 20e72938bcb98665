//! Bounding-box preloader.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{PreloadConfig, PreloadReport};
use crate::coord::{tiles_in_bounds, GeoBounds};
use crate::fetch::{TileFetcher, UrlTemplate};
use crate::provider::AsyncHttpClient;

/// Warms the tile cache for a geographic region.
///
/// Tiles are fetched in fixed-size batches: all tiles in a batch are requested
/// concurrently, and the preloader pauses between batches so a large region
/// does not flood the tile server. A failed tile is logged and counted but
/// never aborts the run.
pub struct RegionPreloader<C> {
    fetcher: Arc<TileFetcher<C>>,
    config: PreloadConfig,
}

impl<C: AsyncHttpClient + 'static> RegionPreloader<C> {
    pub fn new(fetcher: Arc<TileFetcher<C>>, config: PreloadConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    /// Distinct tile URLs covering `bounds` at each zoom, in zoom order then
    /// row-major order.
    ///
    /// Zero-area bounds and an empty zoom list produce no URLs. Unsupported
    /// zoom levels are skipped.
    pub fn plan(
        &self,
        bounds: &GeoBounds,
        zoom_levels: &[u8],
        template: &UrlTemplate,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for &zoom in zoom_levels {
            let Some(range) = tiles_in_bounds(bounds, zoom) else {
                if !bounds.is_degenerate() {
                    warn!(zoom, "Skipping unsupported zoom level");
                }
                continue;
            };

            for coord in range {
                let url = template.expand(&coord);
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
        }

        urls
    }

    /// Fetch and cache every tile in the region that is not already cached.
    pub async fn preload(
        &self,
        bounds: &GeoBounds,
        zoom_levels: &[u8],
        template: &UrlTemplate,
    ) -> PreloadReport {
        let urls = self.plan(bounds, zoom_levels, template);
        let store = self.fetcher.store();

        let mut report = PreloadReport {
            requested: urls.len(),
            ..Default::default()
        };

        let pending: Vec<String> = urls
            .into_iter()
            .filter(|url| !store.contains(url))
            .collect();
        report.skipped_cached = report.requested - pending.len();

        info!(
            tiles = report.requested,
            to_fetch = pending.len(),
            zoom_levels = ?zoom_levels,
            "Starting region preload"
        );

        let batch_size = self.config.effective_batch_size();
        for (index, batch) in pending.chunks(batch_size).enumerate() {
            if index > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let results =
                join_all(batch.iter().map(|url| self.fetcher.fetch_and_store(url))).await;

            let failed = results.iter().filter(|r| r.is_err()).count();
            report.fetched += results.len() - failed;
            report.failed += failed;
            report.batches += 1;

            debug!(
                batch = index + 1,
                size = batch.len(),
                failed,
                "Preload batch complete"
            );
        }

        info!(
            requested = report.requested,
            fetched = report.fetched,
            skipped_cached = report.skipped_cached,
            failed = report.failed,
            batches = report.batches,
            "Region preload complete"
        );

        report
    }

    /// Run [`preload`](Self::preload) on a background task.
    pub fn spawn(
        self: &Arc<Self>,
        bounds: GeoBounds,
        zoom_levels: Vec<u8>,
        template: UrlTemplate,
    ) -> JoinHandle<PreloadReport> {
        let preloader = Arc::clone(self);
        tokio::spawn(async move { preloader.preload(&bounds, &zoom_levels, &template).await })
    }
}

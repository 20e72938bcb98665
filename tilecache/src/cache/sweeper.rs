//! Periodic TTL sweep daemon.
//!
//! Runs on its own tokio task and calls
//! [`TileCacheStore::sweep_expired`] every interval. The daemon only holds a
//! `Weak` reference, so it stops by itself once the store is dropped;
//! [`TileCacheStore::dispose`] stops it explicitly through the cancellation
//! token.

use std::sync::Weak;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::store::TileCacheStore;

/// Background daemon that expires stale tiles.
pub struct SweepDaemon {
    store: Weak<TileCacheStore>,
    interval: Duration,
}

impl SweepDaemon {
    pub fn new(store: Weak<TileCacheStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs the sweep loop until shutdown is signalled or the store is gone.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Tile cache sweeper starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Tile cache sweeper shutting down");
                    break;
                }

                _ = interval.tick() => {
                    let Some(store) = self.store.upgrade() else {
                        debug!("Tile cache dropped, sweeper exiting");
                        break;
                    };
                    store.sweep_expired();
                }
            }
        }
    }
}

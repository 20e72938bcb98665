//! Ordered background writer for mirror operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::TileMirror;
use crate::cache::types::CachedTile;

enum MirrorOp {
    Store(CachedTile),
    Delete(String),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Counters for mirror operations applied by the writer.
#[derive(Debug, Default)]
pub struct MirrorStats {
    writes: AtomicU64,
    deletes: AtomicU64,
    failures: AtomicU64,
}

impl MirrorStats {
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Operations that failed and were dropped.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Single consumer that applies mirror operations in FIFO order.
///
/// Enqueueing never blocks. Errors are logged and counted, never returned:
/// the in-memory store stays authoritative for the running session.
pub struct MirrorWriter {
    tx: Mutex<Option<mpsc::UnboundedSender<MirrorOp>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<MirrorStats>,
    backend: String,
}

impl MirrorWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(mirror: Arc<dyn TileMirror>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(MirrorStats::default());
        let backend = mirror.name().to_string();
        let handle = tokio::spawn(run_writer(mirror, rx, Arc::clone(&stats)));

        Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            stats,
            backend,
        }
    }

    /// Queue a write of `tile`.
    pub fn store(&self, tile: CachedTile) {
        self.send(MirrorOp::Store(tile));
    }

    /// Queue removal of `url`.
    pub fn delete(&self, url: String) {
        self.send(MirrorOp::Delete(url));
    }

    /// Queue removal of every record.
    pub fn clear(&self) {
        self.send(MirrorOp::Clear);
    }

    /// Wait until every operation queued before this call has been applied.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.send(MirrorOp::Flush(ack_tx)) {
            let _ = ack_rx.await;
        }
    }

    /// Drain pending operations and stop the writer task.
    ///
    /// Operations queued after shutdown are dropped.
    pub async fn shutdown(&self) {
        // Dropping the sender ends the writer loop once the queue is empty
        drop(self.tx.lock().take());

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Mirror writer task failed");
            }
        }
    }

    pub fn stats(&self) -> &MirrorStats {
        &self.stats
    }

    /// Name of the mirror backend.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    fn send(&self, op: MirrorOp) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(op).is_ok(),
            None => {
                debug!(backend = %self.backend, "Mirror writer stopped, dropping operation");
                false
            }
        }
    }
}

async fn run_writer(
    mirror: Arc<dyn TileMirror>,
    mut rx: mpsc::UnboundedReceiver<MirrorOp>,
    stats: Arc<MirrorStats>,
) {
    debug!(backend = mirror.name(), "Mirror writer started");

    while let Some(op) = rx.recv().await {
        match op {
            MirrorOp::Store(tile) => {
                let url = tile.url.clone();
                match mirror.store(tile).await {
                    Ok(()) => {
                        stats.writes.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        stats.failures.fetch_add(1, Ordering::Relaxed);
                        warn!(url = %url, backend = mirror.name(), error = %e, "Failed to persist tile");
                    }
                }
            }
            MirrorOp::Delete(url) => match mirror.delete(&url).await {
                Ok(()) => {
                    stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(url = %url, backend = mirror.name(), error = %e, "Failed to delete persisted tile");
                }
            },
            MirrorOp::Clear => {
                if let Err(e) = mirror.clear().await {
                    stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(backend = mirror.name(), error = %e, "Failed to clear tile mirror");
                }
            }
            MirrorOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }

    debug!(backend = mirror.name(), "Mirror writer stopped");
}

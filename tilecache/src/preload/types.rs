//! Preload configuration and results.

use std::fmt;
use std::time::Duration;

/// Default number of tiles fetched concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default pause between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Configuration for the region preloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Tiles fetched concurrently per batch. Zero is treated as one.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl PreloadConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Batch size actually used.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Outcome of a preload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Distinct tile URLs covering the region
    pub requested: usize,
    /// URLs already cached and skipped
    pub skipped_cached: usize,
    /// Tiles downloaded and stored
    pub fetched: usize,
    /// Tiles whose download failed
    pub failed: usize,
    /// Batches issued
    pub batches: usize,
}

impl PreloadReport {
    /// Every tile is either cached or freshly fetched.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for PreloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles: {} fetched, {} already cached, {} failed ({} batches)",
            self.requested, self.fetched, self.skipped_cached, self.failed, self.batches
        )
    }
}

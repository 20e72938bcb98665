//! Region preloading.
//!
//! Enumerates the tiles covering a bounding box at one or more zoom levels
//! and pulls them into the cache ahead of use, in rate-limited batches.

mod region;
mod types;

pub use region::RegionPreloader;
pub use types::{PreloadConfig, PreloadReport, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};

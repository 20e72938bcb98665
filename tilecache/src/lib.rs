//! TileCache - offline-capable map tile caching
//!
//! This library keeps map tiles available without a network connection: a
//! size-bounded, TTL-governed in-memory store mirrored to disk, a cache-first
//! tile fetcher, and a region preloader that pulls every tile covering a
//! bounding box ahead of time.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```no_run
//! use tilecache::coord::GeoBounds;
//! use tilecache::fetch::UrlTemplate;
//! use tilecache::service::{ServiceConfig, TileCacheService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TileCacheService::start(ServiceConfig::default()).await?;
//!
//! let template = UrlTemplate::new("https://{s}.tile.example.org/{z}/{x}/{y}.png")?;
//! let bounds = GeoBounds::new(51.6, 51.4, 0.1, -0.3)?;
//! let report = service.preload(&bounds, &[10, 11, 12], &template).await;
//! println!("{report}");
//!
//! service.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod preload;
pub mod provider;
pub mod service;
pub mod time;

/// Version of the tilecache library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

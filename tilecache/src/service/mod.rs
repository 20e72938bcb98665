//! High-level service facade for tilecache.
//!
//! This module provides a simplified API that encapsulates all component
//! wiring and configuration, following the Facade pattern.
//!
//! # Example
//!
//! ```no_run
//! use tilecache::config::ConfigFile;
//! use tilecache::service::{ServiceConfig, TileCacheService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), tilecache::service::ServiceError> {
//! let file = ConfigFile::load()?;
//! let service = TileCacheService::start(ServiceConfig::from(&file)).await?;
//!
//! println!("{}", service.stats());
//! service.dispose().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod facade;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use facade::TileCacheService;

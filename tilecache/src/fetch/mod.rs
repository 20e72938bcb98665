//! Tile fetch orchestration.
//!
//! [`TileFetcher`] answers tile requests from the cache and downloads misses;
//! [`UrlTemplate`] turns tile coordinates into request URLs (and cache keys).

mod fetcher;
mod template;

pub use fetcher::TileFetcher;
pub use template::{TemplateError, UrlTemplate, DEFAULT_SUBDOMAINS};

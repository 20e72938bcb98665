//! Service configuration types.

use crate::cache::TileCacheConfig;
use crate::config::ConfigFile;
use crate::preload::PreloadConfig;
use crate::provider::HttpClientConfig;

/// Configuration for the tile cache service.
///
/// Combines the store, preloader and HTTP client settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tilecache::cache::TileCacheConfig;
/// use tilecache::service::ServiceConfig;
///
/// let config = ServiceConfig::default()
///     .with_cache(TileCacheConfig::default().with_capacity_mb(8));
///
/// assert_eq!(config.cache.capacity_bytes, 8 * 1024 * 1024);
/// assert_eq!(config.preload.batch_delay, Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub cache: TileCacheConfig,
    pub preload: PreloadConfig,
    pub http: HttpClientConfig,
}

impl ServiceConfig {
    pub fn with_cache(mut self, cache: TileCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_preload(mut self, preload: PreloadConfig) -> Self {
        self.preload = preload;
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }
}

impl From<&ConfigFile> for ServiceConfig {
    fn from(file: &ConfigFile) -> Self {
        Self {
            cache: file.cache_config(),
            preload: file.preload_config(),
            http: file.http_client_config(),
        }
    }
}

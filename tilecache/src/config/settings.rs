//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::TileCacheConfig;
use crate::preload::PreloadConfig;
use crate::provider::HttpClientConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub preload: PreloadSettings,
    pub network: NetworkSettings,
    pub logging: LoggingSettings,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Directory holding the persistent tile mirror
    pub directory: PathBuf,
    /// Persist tiles across restarts
    pub persist: bool,
    /// In-memory capacity in bytes
    pub capacity: u64,
    pub ttl_hours: u64,
    /// Zero disables the background sweeper
    pub sweep_interval_secs: u64,
}

/// `[preload]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PreloadSettings {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// Request timeout; `None` uses the transport default
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Store configuration for these settings.
    pub fn cache_config(&self) -> TileCacheConfig {
        let config = TileCacheConfig::default()
            .with_capacity_bytes(self.cache.capacity)
            .with_ttl_hours(self.cache.ttl_hours)
            .with_sweep_interval(Duration::from_secs(self.cache.sweep_interval_secs));

        if self.cache.persist {
            config.with_mirror_dir(self.cache.directory.clone())
        } else {
            config
        }
    }

    /// Preloader configuration for these settings.
    pub fn preload_config(&self) -> PreloadConfig {
        PreloadConfig::default()
            .with_batch_size(self.preload.batch_size)
            .with_batch_delay(Duration::from_millis(self.preload.batch_delay_ms))
    }

    /// HTTP client configuration for these settings.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.network.timeout_secs.map(Duration::from_secs),
            user_agent: self.network.user_agent.clone(),
        }
    }
}

//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::{config_directory, default_cache_directory};
use super::settings::*;
use crate::cache::{DEFAULT_CAPACITY_BYTES, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::preload::{DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
use crate::provider::DEFAULT_USER_AGENT;

pub const DEFAULT_CAPACITY: u64 = DEFAULT_CAPACITY_BYTES;
pub const DEFAULT_TTL_HOURS: u64 = DEFAULT_TTL.as_secs() / 3600;
/// Upper bound accepted for `[cache] ttl_hours` (ten years).
pub const MAX_TTL_HOURS: u64 = 10 * 365 * 24;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = DEFAULT_SWEEP_INTERVAL.as_secs();
pub const DEFAULT_PERSIST: bool = true;
pub const DEFAULT_PRELOAD_BATCH_SIZE: usize = DEFAULT_BATCH_SIZE;
pub const DEFAULT_PRELOAD_BATCH_DELAY_MS: u64 = DEFAULT_BATCH_DELAY.as_millis() as u64;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "tilecache.log";

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            persist: DEFAULT_PERSIST,
            capacity: DEFAULT_CAPACITY,
            ttl_hours: DEFAULT_TTL_HOURS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_PRELOAD_BATCH_SIZE,
            batch_delay_ms: DEFAULT_PRELOAD_BATCH_DELAY_MS,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

/// Default log file path (~/.tilecache/tilecache.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

//! Configuration for tilecache components.
//!
//! Library components take plain config structs ([`TileCacheConfig`],
//! [`PreloadConfig`], [`HttpClientConfig`]). The INI file at
//! `~/.tilecache/config.ini` is loaded into a [`ConfigFile`] and converted
//! into those structs.
//!
//! # Example
//!
//! ```
//! use tilecache::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let cache = config.cache_config();
//! assert_eq!(cache.capacity_bytes, 50 * 1024 * 1024);
//! ```
//!
//! [`TileCacheConfig`]: crate::cache::TileCacheConfig
//! [`PreloadConfig`]: crate::preload::PreloadConfig
//! [`HttpClientConfig`]: crate::provider::HttpClientConfig

mod defaults;
mod file;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, default_cache_directory, ConfigFileError};
pub use settings::{CacheSettings, ConfigFile, LoggingSettings, NetworkSettings, PreloadSettings};
pub use size::{format_size, parse_size, SizeParseError};

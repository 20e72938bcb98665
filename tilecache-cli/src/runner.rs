//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime and service
//! creation, and file output to reduce duplication across command handlers.

use std::future::Future;
use std::path::Path;

use tilecache::config::ConfigFile;
use tilecache::logging::{init_logging, LoggingGuard, LoggingOptions};
use tilecache::service::{ServiceConfig, TileCacheService};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    runtime: Runtime,
    config: ConfigFile,
    /// Logging guard - keeps logging active while runner exists; dropped last
    logging_guard: LoggingGuard,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// Log events always go to the configured log file. With `debug_mode`
    /// they are also printed to stdout at debug level, unless RUST_LOG says
    /// otherwise.
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let options = LoggingOptions::new(config.logging.file.clone())
            .with_stdout(debug_mode)
            .with_debug(debug_mode);
        let logging_guard =
            init_logging(&options).map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            runtime,
            config,
            logging_guard,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = tilecache::VERSION, command, "tilecache CLI starting");
        info!(log_file = %self.logging_guard.path().display(), "Logging initialized");
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Service configuration derived from the loaded config file.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::from(&self.config)
    }

    /// Start a service.
    ///
    /// Must be awaited inside [`block_on`](Self::block_on).
    pub async fn start_service(&self, config: ServiceConfig) -> Result<TileCacheService, CliError> {
        let service = TileCacheService::start(config)
            .await
            .map_err(CliError::ServiceCreation)?;
        info!("Service created successfully");
        Ok(service)
    }

    /// Write tile bytes to a file.
    pub fn save_tile(&self, path: &Path, data: &[u8]) -> Result<(), CliError> {
        std::fs::write(path, data).map_err(|e| CliError::FileWrite {
            path: path.to_path_buf(),
            error: e,
        })?;

        info!(path = %path.display(), bytes = data.len(), "Tile saved");
        Ok(())
    }
}

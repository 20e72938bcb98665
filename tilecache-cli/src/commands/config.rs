//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show` for locating,
//! creating and inspecting `~/.tilecache/config.ini`.

use clap::Subcommand;
use tilecache::config::{config_file_path, format_size, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,

    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
        ConfigCommands::Show => run_show(),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init() -> Result<(), CliError> {
    let (path, created) = ConfigFile::ensure_exists()?;

    if created {
        println!("Created default configuration at {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
    }
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    for line in describe(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// Effective settings as `section.key = value` lines.
fn describe(config: &ConfigFile) -> Vec<String> {
    let timeout = config
        .network
        .timeout_secs
        .map(|secs| format!("{}s", secs))
        .unwrap_or_else(|| "none".to_string());

    vec![
        format!("cache.directory = {}", config.cache.directory.display()),
        format!("cache.persist = {}", config.cache.persist),
        format!("cache.capacity = {}", format_size(config.cache.capacity)),
        format!("cache.ttl_hours = {}", config.cache.ttl_hours),
        format!("cache.sweep_interval_secs = {}", config.cache.sweep_interval_secs),
        format!("preload.batch_size = {}", config.preload.batch_size),
        format!("preload.batch_delay_ms = {}", config.preload.batch_delay_ms),
        format!("network.timeout = {}", timeout),
        format!("network.user_agent = {}", config.network.user_agent),
        format!("logging.file = {}", config.logging.file.display()),
    ]
}

//! tilecache CLI - Command-line interface
//!
//! This binary provides a command-line interface to the tilecache library:
//! fetch single tiles through the cache, preload regions for offline use,
//! and inspect or clear the persisted cache.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::preload::PreloadArgs;

#[derive(Parser)]
#[command(name = "tilecache")]
#[command(version = tilecache::VERSION)]
#[command(about = "Cache map tiles for offline use", long_about = None)]
struct Cli {
    /// Enable debug logging and mirror log output to stdout
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load one tile through the cache
    Fetch(FetchArgs),

    /// Cache every tile covering a bounding box
    Preload(PreloadArgs),

    /// Inspect or clear the persisted tile cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    let result = match cli.command {
        Commands::Fetch(args) => commands::fetch::run(args, debug),
        Commands::Preload(args) => commands::preload::run(args, debug),
        Commands::Cache { action } => commands::cache::run(action, debug),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_by_xy() {
        let cli = Cli::try_parse_from([
            "tilecache",
            "fetch",
            "--template",
            "https://{s}.t/{z}/{x}/{y}.png",
            "--x",
            "3",
            "--y",
            "5",
            "--zoom",
            "4",
            "--subdomains",
            "a,b",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.x, Some(3));
                assert_eq!(args.y, Some(5));
                assert_eq!(args.zoom, 4);
                assert_eq!(args.template.subdomains, vec!["a", "b"]);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_fetch_xy_conflicts_with_lat_lon() {
        let result = Cli::try_parse_from([
            "tilecache",
            "fetch",
            "-t",
            "https://t/{z}/{x}/{y}.png",
            "--x",
            "1",
            "--y",
            "1",
            "--lat",
            "10",
            "--lon",
            "10",
            "-z",
            "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_preload_with_negative_bounds_and_zooms() {
        let cli = Cli::try_parse_from([
            "tilecache",
            "--debug",
            "preload",
            "--template",
            "https://t/{z}/{x}/{y}.png",
            "--north",
            "60",
            "--south",
            "-10",
            "--east",
            "-10",
            "--west",
            "-170",
            "--zoom",
            "2",
            "--zoom",
            "3",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Commands::Preload(args) => {
                assert_eq!(args.south, -10.0);
                assert_eq!(args.west, -170.0);
                assert_eq!(args.zoom, vec![2, 3]);
                assert!(args.batch_size.is_none());
            }
            _ => panic!("expected preload"),
        }
    }

    #[test]
    fn test_preload_requires_zoom() {
        let result = Cli::try_parse_from([
            "tilecache",
            "preload",
            "-t",
            "https://t/{z}/{x}/{y}.png",
            "--north",
            "1",
            "--south",
            "0",
            "--east",
            "1",
            "--west",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_cache_and_config_commands() {
        let cli = Cli::try_parse_from(["tilecache", "cache", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Clear
            }
        ));

        let cli = Cli::try_parse_from(["tilecache", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Path
            }
        ));
    }
}

//! Cache management CLI commands.

use clap::Subcommand;
use tilecache::cache::CacheStats;
use tilecache::config::format_size;
use tilecache::time::{Clock, SystemClock};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show statistics for the persisted tile cache
    Stats,
    /// Remove every cached tile from memory and disk
    Clear,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("cache");

    let settings = &runner.config().cache;
    if !settings.persist {
        println!("Tile persistence is disabled (persist = false); nothing is cached on disk.");
        return Ok(());
    }
    println!("Tile cache: {}", settings.directory.display());

    let service_config = runner.service_config();
    runner.block_on(async {
        let service = runner.start_service(service_config).await?;

        match action {
            CacheAction::Stats => {
                print_stats(&service.stats(), service.config().cache.capacity_bytes);
            }
            CacheAction::Clear => {
                let stats = service.stats();
                service.clear();
                println!(
                    "Removed {} tiles, freed {}",
                    stats.tile_count,
                    format_size(stats.total_size)
                );
            }
        }

        service.dispose().await;
        Ok::<_, CliError>(())
    })
}

fn print_stats(stats: &CacheStats, capacity: u64) {
    println!("  Tiles:    {}", stats.tile_count);
    println!(
        "  Size:     {} of {}",
        format_size(stats.total_size),
        format_size(capacity)
    );
    if stats.tile_count > 0 {
        println!("  Oldest:   {}", describe_age(stats.oldest_tile));
        println!("  Newest:   {}", describe_age(stats.newest_tile));
    }
}

/// Human-readable age of a millisecond epoch timestamp.
fn describe_age(timestamp_ms: u64) -> String {
    let now_ms = SystemClock.now_millis();
    format_age(now_ms.saturating_sub(timestamp_ms) / 1000)
}

fn format_age(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{}s ago", s),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h {}m ago", s / 3600, (s % 3600) / 60),
        s => format!("{}d {}h ago", s / 86_400, (s % 86_400) / 3600),
    }
}

//! Preload command - cache every tile covering a region.

use std::time::{Duration, Instant};

use clap::Args;
use tilecache::coord::GeoBounds;

use super::common::TemplateArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the preload command.
#[derive(Debug, Args)]
pub struct PreloadArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Northern latitude of the region
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern latitude of the region
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern longitude of the region
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western longitude of the region
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,

    /// Zoom level to preload (repeat for several levels)
    #[arg(long, short, required = true)]
    pub zoom: Vec<u8>,

    /// Tiles fetched concurrently per batch (overrides config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between batches in milliseconds (overrides config)
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,
}

/// Run the preload command.
pub fn run(args: PreloadArgs, debug: bool) -> Result<(), CliError> {
    let bounds = GeoBounds::new(args.north, args.south, args.east, args.west)?;
    let template = args.template.to_template()?;

    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("preload");

    let mut service_config = runner.service_config();
    if let Some(batch_size) = args.batch_size {
        service_config.preload = service_config.preload.with_batch_size(batch_size);
    }
    if let Some(delay_ms) = args.batch_delay_ms {
        service_config.preload = service_config
            .preload
            .with_batch_delay(Duration::from_millis(delay_ms));
    }

    runner.block_on(async {
        let service = runner.start_service(service_config).await?;

        let planned = service.preloader().plan(&bounds, &args.zoom, &template).len();
        println!(
            "Preloading {} tiles from {} at zoom {:?}",
            planned, template, args.zoom
        );

        let start = Instant::now();
        let report = service.preload(&bounds, &args.zoom, &template).await;
        service.dispose().await;

        println!("{} in {:.1}s", report, start.elapsed().as_secs_f64());
        if !report.is_complete() {
            println!("Some tiles failed to download; see the log file for details.");
        }
        Ok::<_, CliError>(())
    })
}

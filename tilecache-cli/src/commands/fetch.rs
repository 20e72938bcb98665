//! Fetch command - load a single tile through the cache.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tilecache::config::format_size;
use tilecache::coord::{to_tile_coords, tiles_per_axis, CoordError, TileCoord, MAX_ZOOM};

use super::common::TemplateArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    /// Tile column
    #[arg(long, requires = "y", conflicts_with_all = ["lat", "lon"])]
    pub x: Option<u32>,

    /// Tile row
    #[arg(long, requires = "x")]
    pub y: Option<u32>,

    /// Latitude in decimal degrees (alternative to --x/--y)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Zoom level
    #[arg(long, short)]
    pub zoom: u8,

    /// Write the tile bytes to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    /// Tile addressed by either `--x/--y` or `--lat/--lon`.
    fn coord(&self) -> Result<TileCoord, CliError> {
        match (self.x, self.y, self.lat, self.lon) {
            (Some(x), Some(y), _, _) => {
                if self.zoom > MAX_ZOOM {
                    return Err(CoordError::InvalidZoom(self.zoom).into());
                }
                let n = tiles_per_axis(self.zoom);
                if x >= n || y >= n {
                    return Err(CliError::Config(format!(
                        "tile {}/{}/{} is outside the {}x{} grid at that zoom",
                        self.zoom, x, y, n, n
                    )));
                }
                Ok(TileCoord::new(x, y, self.zoom))
            }
            (_, _, Some(lat), Some(lon)) => Ok(to_tile_coords(lat, lon, self.zoom)?),
            _ => Err(CliError::Config(
                "either --x and --y or --lat and --lon is required".to_string(),
            )),
        }
    }
}

/// Run the fetch command.
pub fn run(args: FetchArgs, debug: bool) -> Result<(), CliError> {
    let coord = args.coord()?;
    let template = args.template.to_template()?;

    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("fetch");

    let url = template.expand(&coord);
    println!("Tile {} -> {}", coord, url);

    let service_config = runner.service_config();
    let data = runner.block_on(async {
        let service = runner.start_service(service_config).await?;
        let cached = service.store().contains(&url);

        let start = Instant::now();
        let result = service.load_coord(&template, &coord).await;
        let elapsed = start.elapsed();
        service.dispose().await;

        let data = result?;
        let source = if cached { "cache" } else { "network" };
        println!(
            "Loaded {} from {} in {:.2}s",
            format_size(data.len() as u64),
            source,
            elapsed.as_secs_f64()
        );
        Ok::<_, CliError>(data)
    })?;

    if let Some(output) = &args.output {
        runner.save_tile(output, &data)?;
        println!("Saved to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(
        x: Option<u32>,
        y: Option<u32>,
        lat: Option<f64>,
        lon: Option<f64>,
        zoom: u8,
    ) -> FetchArgs {
        FetchArgs {
            template: TemplateArgs {
                template: "https://t/{z}/{x}/{y}.png".to_string(),
                subdomains: Vec::new(),
            },
            x,
            y,
            lat,
            lon,
            zoom,
            output: None,
        }
    }

    #[test]
    fn test_coord_from_xy() {
        let coord = args(Some(3), Some(5), None, None, 4).coord().unwrap();
        assert_eq!(coord, TileCoord::new(3, 5, 4));
    }

    #[test]
    fn test_coord_from_lat_lon() {
        let coord = args(None, None, Some(0.0), Some(0.0), 1).coord().unwrap();
        assert_eq!(coord, TileCoord::new(1, 1, 1));
    }

    #[test]
    fn test_coord_outside_grid() {
        let result = args(Some(2), Some(0), None, None, 1).coord();
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_coord_rejects_large_zoom() {
        let result = args(Some(0), Some(0), None, None, 30).coord();
        assert!(matches!(result, Err(CliError::Coord(CoordError::InvalidZoom(30)))));
    }

    #[test]
    fn test_coord_requires_location() {
        let result = args(None, None, None, None, 3).coord();
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}

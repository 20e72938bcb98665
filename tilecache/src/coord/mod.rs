//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile coordinates, plus bounding-box coverage
//! used by the region preloader.

mod types;

pub use types::{
    tiles_per_axis, CoordError, GeoBounds, TileCoord, TileRange, TileRangeIter, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(TileCoord {
        x: lon_to_tile_x(lon, zoom),
        y: lat_to_tile_y(lat, zoom),
        zoom,
    })
}

/// Tile column containing `lon` at `zoom`.
///
/// `floor((lon + 180) / 360 * 2^zoom)`, clamped to the valid column range so
/// that `lon = 180` lands on the last column.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom) as f64;
    let x = ((lon + 180.0) / 360.0 * n).floor();
    clamp_index(x, zoom)
}

/// Tile row containing `lat` at `zoom`.
///
/// `floor((1 - ln(tan(lat) + sec(lat)) / PI) / 2 * 2^zoom)`. Latitude is clamped
/// to the Web Mercator range first, since the projection diverges at the poles.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom) as f64;
    let lat_rad = lat.clamp(MIN_LAT, MAX_LAT).to_radians();
    let merc = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = ((1.0 - merc / PI) / 2.0 * n).floor();
    clamp_index(y, zoom)
}

fn clamp_index(value: f64, zoom: u8) -> u32 {
    let max = (tiles_per_axis(zoom) - 1) as f64;
    value.clamp(0.0, max) as u32
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = tiles_per_axis(tile.zoom) as f64;

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

/// Bing-style quadkey for a tile.
///
/// Levels above bit 31 of a `u32` coordinate always produce a `0` digit.
pub fn tile_to_quadkey(tile: &TileCoord) -> String {
    let mut quadkey = String::with_capacity(tile.zoom as usize);
    for level in (1..=tile.zoom).rev() {
        let mask = 1u32.checked_shl(u32::from(level - 1)).unwrap_or(0);
        let mut digit = b'0';
        if tile.x & mask != 0 {
            digit += 1;
        }
        if tile.y & mask != 0 {
            digit += 2;
        }
        quadkey.push(digit as char);
    }
    quadkey
}

/// Inclusive tile rectangle covering `bounds` at `zoom`.
///
/// West/east longitudes give the column span and north/south latitudes the
/// row span. Returns `None` for zero-area bounds or an unsupported zoom.
pub fn tiles_in_bounds(bounds: &GeoBounds, zoom: u8) -> Option<TileRange> {
    if bounds.is_degenerate() || zoom > MAX_ZOOM {
        return None;
    }

    Some(TileRange {
        zoom,
        min_x: lon_to_tile_x(bounds.west, zoom),
        max_x: lon_to_tile_x(bounds.east, zoom),
        min_y: lat_to_tile_y(bounds.north, zoom),
        max_y: lat_to_tile_y(bounds.south, zoom),
    })
}

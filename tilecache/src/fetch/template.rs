//! Tile URL templates.

use std::fmt;

use thiserror::Error;

use crate::coord::{tile_to_quadkey, TileCoord};

/// Subdomains used when a template has `{s}` and none are configured.
pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Errors raised when building a [`UrlTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Tile URL template must contain {{z}} with {{x}} and {{y}}, or {{q}}: {0}")]
    MissingCoordinates(String),

    #[error("Tile URL template uses {{s}} but no subdomains were given")]
    NoSubdomains,
}

/// A tile server URL pattern such as
/// `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`.
///
/// Placeholders:
///
/// | Placeholder | Value |
/// |-------------|-------|
/// | `{x}` `{y}` `{z}` | slippy-map column, row, zoom |
/// | `{s}` | subdomain, `subdomains[(x + y) % n]` |
/// | `{q}` | Bing-style quadkey |
///
/// Subdomain choice depends only on the coordinate, so a tile always expands
/// to the same URL and therefore hits the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplate {
    /// Parse a template, using [`DEFAULT_SUBDOMAINS`] for `{s}`.
    pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
        Self::with_subdomains(template, DEFAULT_SUBDOMAINS)
    }

    /// Parse a template with explicit subdomains.
    pub fn with_subdomains<I, S>(
        template: impl Into<String>,
        subdomains: I,
    ) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = template.into();
        let subdomains: Vec<String> = subdomains
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();

        let has_xyz =
            template.contains("{z}") && template.contains("{x}") && template.contains("{y}");
        if !has_xyz && !template.contains("{q}") {
            return Err(TemplateError::MissingCoordinates(template));
        }
        if template.contains("{s}") && subdomains.is_empty() {
            return Err(TemplateError::NoSubdomains);
        }

        Ok(Self {
            template,
            subdomains,
        })
    }

    /// Resolve the URL for `coord`.
    pub fn expand(&self, coord: &TileCoord) -> String {
        let mut url = self
            .template
            .replace("{z}", &coord.zoom.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());

        if url.contains("{s}") {
            url = url.replace("{s}", self.subdomain_for(coord));
        }
        if url.contains("{q}") {
            url = url.replace("{q}", &tile_to_quadkey(coord));
        }
        url
    }

    fn subdomain_for(&self, coord: &TileCoord) -> &str {
        if self.subdomains.is_empty() {
            return "";
        }
        let index = (coord.x as u64 + coord.y as u64) % self.subdomains.len() as u64;
        &self.subdomains[index as usize]
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

//! Common types and utilities shared across CLI commands.

use clap::Args;
use tilecache::fetch::UrlTemplate;

use crate::error::CliError;

/// Tile server arguments shared by `fetch` and `preload`.
#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Tile URL template with {z}, {x}, {y} (or {q}) and optional {s},
    /// e.g. https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png
    #[arg(long, short)]
    pub template: String,

    /// Comma-separated subdomains substituted for {s} (default: a,b,c)
    #[arg(long, value_delimiter = ',')]
    pub subdomains: Vec<String>,
}

impl TemplateArgs {
    /// Build the URL template, applying any subdomain override.
    pub fn to_template(&self) -> Result<UrlTemplate, CliError> {
        let subdomains: Vec<&str> = self
            .subdomains
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        let template = if subdomains.is_empty() {
            UrlTemplate::new(self.template.as_str())?
        } else {
            UrlTemplate::with_subdomains(self.template.as_str(), subdomains)?
        };
        Ok(template)
    }
}

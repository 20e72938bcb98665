//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;
use super::size::format_size;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let timeout_secs = config
        .network
        .timeout_secs
        .map(|secs| secs.to_string())
        .unwrap_or_default();

    format!(
        r#"[cache]
; Directory for the persistent tile mirror (one file per tile)
directory = {}
; Keep tiles across restarts (default: true)
persist = {}
; In-memory capacity (default: 50MB)
; Supports: KB, MB, GB suffixes (e.g., 512KB, 50MB, 1GB)
capacity = {}
; Tile time-to-live in hours (default: 24)
ttl_hours = {}
; Seconds between expiry sweeps, 0 disables sweeping (default: 300)
sweep_interval_secs = {}

[preload]
; Tiles fetched concurrently per batch (default: 5)
batch_size = {}
; Pause between batches in milliseconds (default: 100)
batch_delay_ms = {}

[network]
; Request timeout in seconds; leave empty for no timeout
timeout_secs = {}
; User-Agent header sent to tile servers
user_agent = {}

[logging]
; Log file path
file = {}
"#,
        path_to_string(&config.cache.directory),
        config.cache.persist,
        format_size(config.cache.capacity),
        config.cache.ttl_hours,
        config.cache.sweep_interval_secs,
        config.preload.batch_size,
        config.preload.batch_delay_ms,
        timeout_secs,
        config.network.user_agent,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());

        for section in ["[cache]", "[preload]", "[network]", "[logging]"] {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("capacity = 50MB"));
        assert!(content.contains("timeout_secs = \n"));
    }
}

//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::defaults::MAX_TTL_HOURS;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use super::size::parse_size;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section, "directory") {
            config.cache.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "persist") {
            config.cache.persist = parse_bool("cache", "persist", v)?;
        }
        if let Some(v) = non_empty(section, "capacity") {
            let capacity = parse_size(v).map_err(|_| {
                invalid(
                    "cache",
                    "capacity",
                    v,
                    "expected format like '50MB', '1GB', or '512KB'",
                )
            })?;
            if capacity == 0 {
                return Err(invalid("cache", "capacity", v, "must be greater than zero"));
            }
            config.cache.capacity = capacity;
        }
        if let Some(v) = non_empty(section, "ttl_hours") {
            let hours: u64 = parse_number("cache", "ttl_hours", v, "must be a positive integer")?;
            if hours == 0 {
                return Err(invalid("cache", "ttl_hours", v, "must be greater than zero"));
            }
            if hours > MAX_TTL_HOURS {
                return Err(invalid(
                    "cache",
                    "ttl_hours",
                    v,
                    &format!("must not exceed {}", MAX_TTL_HOURS),
                ));
            }
            config.cache.ttl_hours = hours;
        }
        if let Some(v) = non_empty(section, "sweep_interval_secs") {
            config.cache.sweep_interval_secs = parse_number(
                "cache",
                "sweep_interval_secs",
                v,
                "must be a non-negative integer (0 disables sweeping)",
            )?;
        }
    }

    // [preload] section
    if let Some(section) = ini.section(Some("preload")) {
        if let Some(v) = non_empty(section, "batch_size") {
            let size: usize =
                parse_number("preload", "batch_size", v, "must be a positive integer")?;
            if size == 0 {
                return Err(invalid("preload", "batch_size", v, "must be greater than zero"));
            }
            config.preload.batch_size = size;
        }
        if let Some(v) = non_empty(section, "batch_delay_ms") {
            config.preload.batch_delay_ms = parse_number(
                "preload",
                "batch_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
    }

    // [network] section
    if let Some(section) = ini.section(Some("network")) {
        if let Some(v) = non_empty(section, "timeout_secs") {
            let secs: u64 = parse_number(
                "network",
                "timeout_secs",
                v,
                "must be a positive integer (seconds), or empty for no timeout",
            )?;
            config.network.timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(v) = non_empty(section, "user_agent") {
            config.network.user_agent = v.to_string();
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Trimmed value for `key`, treating blank values as unset.
fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

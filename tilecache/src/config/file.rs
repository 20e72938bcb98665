//! Reading and writing `~/.tilecache/config.ini`.
//!
//! A missing file is not an error: every key has a default, so the tile
//! cache runs unconfigured. Key mapping lives in [`super::parser`] and
//! [`super::writer`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;

const CONFIG_DIR_NAME: &str = ".tilecache";
const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A key holds a value the tile cache cannot use
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ConfigFile {
    /// Settings from [`config_file_path`], or defaults when no file exists.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Settings from `path`, or defaults when no file exists.
    ///
    /// Keys absent from the file keep their default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match Ini::load_from_file(path) {
            Ok(ini) => super::parser::parse_ini(&ini),
            Err(ini::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(ini::Error::Io(e)) => Err(ConfigFileError::io(path, e)),
            Err(ini::Error::Parse(source)) => Err(ConfigFileError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Write every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::io(parent, e))?;
        }

        std::fs::write(path, super::writer::to_config_string(self))
            .map_err(|e| ConfigFileError::io(path, e))
    }

    /// Write a default file unless one is already present.
    ///
    /// Returns the file path and whether it was created by this call.
    pub fn ensure_exists() -> Result<(PathBuf, bool), ConfigFileError> {
        let path = config_file_path();
        if path.exists() {
            return Ok((path, false));
        }
        Self::default().save_to(&path)?;
        Ok((path, true))
    }
}

/// `~/.tilecache`, or `./.tilecache` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Default tile mirror directory: the platform cache dir plus `tilecache/tiles`.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(config_directory)
        .join("tilecache")
        .join("tiles")
}

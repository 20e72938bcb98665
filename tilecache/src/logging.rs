//! Logging infrastructure for tilecache.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to the configured log file (cleared on session start)
//! - Optionally mirrors events to stdout for interactive use
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Full path of the log file
    pub file: PathBuf,
    /// Also write events to stdout
    pub stdout: bool,
    /// Default filter level when RUST_LOG is not set
    pub default_level: &'static str,
}

impl LoggingOptions {
    /// File-only logging at `info`.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            stdout: false,
            default_level: "info",
        }
    }

    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    /// Lower the default level to `debug`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.default_level = if debug { "debug" } else { "info" };
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Creates the log directory if needed, clears the previous log file,
/// and installs a file layer plus an optional stdout layer.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (dir, file_name) = split_log_path(&options.file)?;

    fs::create_dir_all(&dir)?;
    fs::write(&options.file, "")?;

    let file_appender = tracing_appender::rolling::never(&dir, &file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = options.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        path: options.file.clone(),
    })
}

/// Split a log path into its directory and file name.
fn split_log_path(path: &Path) -> Result<(PathBuf, String), io::Error> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path has no file name: {}", path.display()),
            )
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("/var/log/tilecache.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(name, "tilecache.log");
    }

    #[test]
    fn test_split_bare_file_name_uses_current_dir() {
        let (dir, name) = split_log_path(Path::new("tilecache.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "tilecache.log");
    }

    #[test]
    fn test_split_rejects_directory_only() {
        let result = split_log_path(Path::new("/"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_options_builders() {
        let options = LoggingOptions::new("/tmp/x.log")
            .with_stdout(true)
            .with_debug(true);
        assert!(options.stdout);
        assert_eq!(options.default_level, "debug");

        let options = options.with_debug(false);
        assert_eq!(options.default_level, "info");
    }

    #[test]
    fn test_clears_existing_file() {
        // init_logging installs a global subscriber, so only the file handling
        // is exercised here.
        let temp_dir = TempDir::new().unwrap();
        let log_file = temp_dir.path().join("nested").join("test.log");
        let (dir, _) = split_log_path(&log_file).unwrap();

        fs::create_dir_all(&dir).unwrap();
        fs::write(&log_file, "old log data").unwrap();
        fs::write(&log_file, "").unwrap();

        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let logging_guard = LoggingGuard {
            _file_guard: guard,
            path: PathBuf::from("test.log"),
        };
        assert_eq!(logging_guard.path(), Path::new("test.log"));
    }
}

//! Process-wide `tracing` setup shared by the workspace binaries.
//!
//! Installs a console layer and, when a log file is configured, a second
//! plain-text layer appending to that file. The level filter comes from
//! `RUST_LOG` when set, otherwise from [`LogConfig::default_level`].

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level filter used when `RUST_LOG` is unset (e.g. "info").
    pub default_level: String,
    /// Optional file that receives a copy of every log line.
    pub file: Option<PathBuf>,
    /// Include the module path of the emitting event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            file: None,
            include_target: false,
        }
    }
}

impl LogConfig {
    /// Console plus `dir/file_name`.
    pub fn with_file(mut self, dir: impl AsRef<Path>, file_name: &str) -> Self {
        self.file = Some(dir.as_ref().join(file_name));
        self
    }

    /// Set the default level filter.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LogInitError {
    /// The log file (or its directory) could not be created.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A global subscriber was already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LogConfig) -> Result<(), LogInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let console = fmt::layer().with_target(config.include_target);

    let file_layer = match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(config.include_target)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Open `path` for appending, creating missing parent directories.
pub fn open_log_file(path: &Path) -> Result<File, LogInitError> {
    let wrap = |source| LogInitError::OpenFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    OpenOptions::new().create(true).append(true).open(path).map_err(wrap)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn open_log_file_creates_directories_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("pipeline.log");

        let mut f = open_log_file(&path).unwrap();
        writeln!(f, "first").unwrap();
        drop(f);
        let mut f = open_log_file(&path).unwrap();
        writeln!(f, "second").unwrap();
        drop(f);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn with_file_joins_directory_and_name() {
        let cfg = LogConfig::default().with_file("logs", "pipeline.log").with_level("debug");
        assert_eq!(cfg.file, Some(PathBuf::from("logs/pipeline.log")));
        assert_eq!(cfg.default_level, "debug");
    }
}

//! Logging infrastructure for PanoHunter.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to the configured log file (cleared on session start)
//! - Optionally mirrors to stderr for interactive runs
//! - Configurable via the RUST_LOG environment variable

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
}

/// Where and how verbosely to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Log file path; its directory is created if missing
    pub file: PathBuf,
    /// Mirror log lines to stderr
    pub console: bool,
    /// Force debug level regardless of RUST_LOG
    pub debug: bool,
}

impl LoggingOptions {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            console: false,
            debug: false,
        }
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file, and
/// installs the global subscriber.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (log_dir, log_file) = split_log_path(&options.file)?;
    fs::create_dir_all(&log_dir)?;

    // Clear previous log file by writing empty content
    fs::write(&options.file, "")?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let console_layer = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter(options.debug))
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Filter for the given verbosity (defaults to INFO if RUST_LOG is not set).
fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), io::Error> {
    let file = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file)))
}

//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from the same state.

use tracing::info;

use panohunter::config::ConfigFile;
use panohunter::logging::{init_logging, LoggingGuard, LoggingOptions};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner with optional debug logging.
    ///
    /// Logs go to the file named in config.ini. With `debug_mode` they are
    /// also mirrored to stderr at debug level.
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let options = LoggingOptions::new(config.logging.file.clone())
            .with_console(debug_mode)
            .with_debug(debug_mode);
        let logging_guard =
            init_logging(&options).map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("PanoHunter v{}", panohunter::VERSION);
        info!("PanoHunter CLI: {} command", command);
    }
}

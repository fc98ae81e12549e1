//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::link::DEFAULT_LINK_DOMAIN;
use crate::scan::{DEFAULT_DELAY_S, DEFAULT_MAX_POINTS, DEFAULT_SEARCH_RADIUS_M, DEFAULT_STEP_KM};

/// Default output directory (the working directory).
pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".";

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "panohunter.log";

/// Default log file path (~/.panohunter/panohunter.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            api: ApiSettings { key: None },
            search: SearchSettings::default(),
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
                link_domain: DEFAULT_LINK_DOMAIN.to_string(),
                json: false,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            step_km: DEFAULT_STEP_KM,
            search_radius: DEFAULT_SEARCH_RADIUS_M,
            max_points: DEFAULT_MAX_POINTS,
            delay: DEFAULT_DELAY_S,
        }
    }
}

//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::scan::ScanConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Metadata API credentials
    pub api: ApiSettings,
    /// Default scan parameters
    pub search: SearchSettings,
    /// Result file settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// API configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Street View Static API key
    pub key: Option<String>,
}

/// Default scan parameters, overridable per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Distance between grid points in kilometers
    pub step_km: f64,
    /// Metadata search radius in meters
    pub search_radius: u32,
    /// Maximum number of grid points probed
    pub max_points: usize,
    /// Pause between requests in seconds
    pub delay: f64,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Directory result files are written to
    pub directory: PathBuf,
    /// Maps domain used in panorama links
    pub link_domain: String,
    /// Also write a JSON export
    pub json: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl SearchSettings {
    /// Scan parameters described by these settings.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new()
            .with_step_km(self.step_km)
            .with_search_radius_m(self.search_radius)
            .with_max_points(self.max_points)
            .with_delay_s(self.delay)
    }
}

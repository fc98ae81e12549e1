//! Config file loading and saving.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

pub use super::settings::ConfigFile;

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.panohunter/config.ini).
    ///
    /// Returns defaults when the file doesn't exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.panohunter/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// Get the path to the config directory (~/.panohunter).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".panohunter")
}

/// Get the path to the config file (~/.panohunter/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::DEFAULT_STEP_KM;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert!(config.api.key.is_none());
        assert_eq!(config.search.step_km, DEFAULT_STEP_KM);
        assert_eq!(config.search.search_radius, 50);
        assert_eq!(config.output.link_domain, "google.de");
        assert!(!config.output.json);
        assert!(config.logging.file.ends_with("panohunter.log"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.api.key = Some("AIzaRoundTrip".to_string());
        config.search.delay = 0.1;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.api.key.as_deref(), Some("AIzaRoundTrip"));
        assert_eq!(loaded.search.delay, 0.1);
    }

    #[test]
    fn test_load_invalid_value() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, "[search]\nmax_points = lots\n").unwrap();

        let err = ConfigFile::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("search.max_points"));
    }
}

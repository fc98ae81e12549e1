//! Configuration key access and validation.
//!
//! Provides a type-safe interface for getting and setting configuration
//! values by key name, with validation via the Specification Pattern.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use super::file::ConfigFile;
use super::parser::{expand_tilde, parse_bool};

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,

    SearchStepKm,
    SearchRadius,
    SearchMaxPoints,
    SearchDelay,

    OutputDirectory,
    OutputLinkDomain,
    OutputJson,

    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s.to_lowercase())
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "search.step_km").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "api.key",
            ConfigKey::SearchStepKm => "search.step_km",
            ConfigKey::SearchRadius => "search.search_radius",
            ConfigKey::SearchMaxPoints => "search.max_points",
            ConfigKey::SearchDelay => "search.delay",
            ConfigKey::OutputDirectory => "output.directory",
            ConfigKey::OutputLinkDomain => "output.link_domain",
            ConfigKey::OutputJson => "output.json",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "search").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "step_km").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Whether the value should be masked when listed.
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::ApiKey)
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ApiKey => config.api.key.clone().unwrap_or_default(),
            ConfigKey::SearchStepKm => config.search.step_km.to_string(),
            ConfigKey::SearchRadius => config.search.search_radius.to_string(),
            ConfigKey::SearchMaxPoints => config.search.max_points.to_string(),
            ConfigKey::SearchDelay => config.search.delay.to_string(),
            ConfigKey::OutputDirectory => path_to_display(&config.output.directory),
            ConfigKey::OutputLinkDomain => config.output.link_domain.clone(),
            ConfigKey::OutputJson => config.output.json.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;

        let value = value.trim();
        match self {
            ConfigKey::ApiKey => {
                config.api.key = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ConfigKey::SearchStepKm => config.search.step_km = self.parse(value)?,
            ConfigKey::SearchRadius => config.search.search_radius = self.parse(value)?,
            ConfigKey::SearchMaxPoints => config.search.max_points = self.parse(value)?,
            ConfigKey::SearchDelay => config.search.delay = self.parse(value)?,
            ConfigKey::OutputDirectory => config.output.directory = expand_tilde(value),
            ConfigKey::OutputLinkDomain => config.output.link_domain = value.to_string(),
            ConfigKey::OutputJson => config.output.json = parse_bool(value).unwrap_or(false),
            ConfigKey::LoggingFile => config.logging.file = expand_tilde(value),
        }
        Ok(())
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value.parse().map_err(|_| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: format!("cannot parse '{}'", value),
        })
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ApiKey => Box::new(AnyStringSpec),
            ConfigKey::SearchStepKm => Box::new(PositiveNumberSpec),
            ConfigKey::SearchRadius => Box::new(PositiveIntegerSpec),
            ConfigKey::SearchMaxPoints => Box::new(PositiveIntegerSpec),
            ConfigKey::SearchDelay => Box::new(NonNegativeNumberSpec),
            ConfigKey::OutputDirectory => Box::new(PathSpec),
            ConfigKey::OutputLinkDomain => Box::new(DomainSpec),
            ConfigKey::OutputJson => Box::new(BooleanSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ApiKey,
            ConfigKey::SearchStepKm,
            ConfigKey::SearchRadius,
            ConfigKey::SearchMaxPoints,
            ConfigKey::SearchDelay,
            ConfigKey::OutputDirectory,
            ConfigKey::OutputLinkDomain,
            ConfigKey::OutputJson,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Specification that accepts any string value.
struct AnyStringSpec;

impl ValueSpecification for AnyStringSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Integers greater than zero.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

/// Finite numbers greater than zero.
struct PositiveNumberSpec;

impl ValueSpecification for PositiveNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
            _ => Err("must be a positive number".to_string()),
        }
    }
}

/// Finite numbers, zero allowed.
struct NonNegativeNumberSpec;

impl ValueSpecification for NonNegativeNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
            _ => Err("must be zero or a positive number".to_string()),
        }
    }
}

/// Specification for boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_bool(value)
            .map(|_| ())
            .ok_or_else(|| "must be true/false, yes/no, 1/0, or on/off".to_string())
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Bare domain names such as `google.com`.
struct DomainSpec;

impl ValueSpecification for DomainSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() || value.contains('/') || !value.contains('.') {
            Err("must be a bare domain like 'google.com'".to_string())
        } else {
            Ok(())
        }
    }
}

/// Convert path to display string, collapsing home dir to ~.
fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

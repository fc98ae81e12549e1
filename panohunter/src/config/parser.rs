//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to struct
//! fields. The value parsers are shared with scan profiles.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{ConfigFile, SearchSettings};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [api] section
    if let Some(section) = ini.section(Some("api")) {
        if let Some(v) = section.get("key") {
            let v = v.trim();
            if !v.is_empty() {
                config.api.key = Some(v.to_string());
            }
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        overlay_search(section, "search", &mut config.search)?;
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("link_domain") {
            let v = v.trim();
            if v.is_empty() || v.contains('/') {
                return Err(invalid("output", "link_domain", v, "must be a bare domain like 'google.com'"));
            }
            config.output.link_domain = v.to_string();
        }
        if let Some(v) = section.get("json") {
            config.output.json = parse_bool(v).ok_or_else(|| {
                invalid("output", "json", v, "must be true/false, yes/no, 1/0, or on/off")
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Overlays `step_km`, `search_radius`, `max_points` and `delay` from a section.
pub(super) fn overlay_search(
    section: &Properties,
    section_name: &str,
    search: &mut SearchSettings,
) -> Result<(), ConfigFileError> {
    if let Some(v) = section.get("step_km") {
        search.step_km = parse_positive_f64(section_name, "step_km", v)?;
    }
    if let Some(v) = section.get("search_radius") {
        search.search_radius = parse_positive(section_name, "search_radius", v)?;
    }
    if let Some(v) = section.get("max_points") {
        search.max_points = parse_positive(section_name, "max_points", v)?;
    }
    if let Some(v) = section.get("delay") {
        let delay: f64 = parse_number(section_name, "delay", v)?;
        if !delay.is_finite() || delay < 0.0 {
            return Err(invalid(section_name, "delay", v, "must be zero or a positive number (seconds)"));
        }
        search.delay = delay;
    }
    Ok(())
}

/// Parses a strictly positive integer.
pub(super) fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

/// Parses a strictly positive, finite number.
pub(super) fn parse_positive_f64(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let n: f64 = parse_number(section, key, value)?;
    if n.is_finite() && n > 0.0 {
        Ok(n)
    } else {
        Err(invalid(section, key, value, "must be a positive number"))
    }
}

/// Parses any number, reporting failures as `InvalidValue`.
pub(super) fn parse_number(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(section, key, value, "must be a number"))
}

/// Parses the boolean spellings accepted in config files.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

pub(super) fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
[api]
key = AIzaTestKey

[search]
step_km = 0.12
search_radius = 80
max_points = 1500
delay = 0.02

[output]
directory = /tmp/panoramas
link_domain = google.com
json = yes

[logging]
file = /tmp/panohunter.log
"#,
        )
        .unwrap();

        assert_eq!(config.api.key.as_deref(), Some("AIzaTestKey"));
        assert_eq!(config.search.step_km, 0.12);
        assert_eq!(config.search.search_radius, 80);
        assert_eq!(config.search.max_points, 1500);
        assert_eq!(config.search.delay, 0.02);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/panoramas"));
        assert_eq!(config.output.link_domain, "google.com");
        assert!(config.output.json);
        assert_eq!(config.logging.file, PathBuf::from("/tmp/panohunter.log"));
    }

    #[test]
    fn test_empty_api_key_is_none() {
        let config = parse("[api]\nkey = \n").unwrap();
        assert!(config.api.key.is_none());
    }

    #[test]
    fn test_invalid_step() {
        match parse("[search]\nstep_km = fast\n") {
            Err(ConfigFileError::InvalidValue { section, key, value, .. }) => {
                assert_eq!(section, "search");
                assert_eq!(key, "step_km");
                assert_eq!(value, "fast");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
        assert!(parse("[search]\nstep_km = 0\n").is_err());
        assert!(parse("[search]\nstep_km = -0.1\n").is_err());
    }

    #[test]
    fn test_invalid_integers() {
        assert!(parse("[search]\nmax_points = 0\n").is_err());
        assert!(parse("[search]\nmax_points = -5\n").is_err());
        assert!(parse("[search]\nsearch_radius = 0\n").is_err());
        assert!(parse("[search]\nsearch_radius = 2.5\n").is_err());
    }

    #[test]
    fn test_zero_delay_allowed() {
        let config = parse("[search]\ndelay = 0\n").unwrap();
        assert_eq!(config.search.delay, 0.0);
        assert!(parse("[search]\ndelay = -1\n").is_err());
    }

    #[test]
    fn test_invalid_output_values() {
        assert!(parse("[output]\njson = maybe\n").is_err());
        assert!(parse("[output]\nlink_domain = https://google.com/\n").is_err());
    }

    #[test]
    fn test_parse_bool_spellings() {
        for v in ["true", "YES", "1", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["false", "no", "0", "Off"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool("maybe"), None);
    }
}

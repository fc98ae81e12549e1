//! Scan profiles
//!
//! A profile names an area and the parameters to scan it with. Profiles are
//! either built-in city presets or INI files:
//!
//! ```ini
//! [bounds]
//! lat_min = 61.66
//! lat_max = 61.69
//! lon_min = 50.81
//! lon_max = 50.86
//!
//! [search]
//! step_km = 0.12
//! search_radius = 50
//! max_points = 800
//! delay = 0.03
//!
//! [output]
//! filename = syktyvkar_panoramas.txt
//! ```
//!
//! All three sections must be present. `[bounds]` needs all four keys; the
//! `[search]` and `[output]` keys fall back to the defaults.

use std::path::Path;

use ini::Ini;
use thiserror::Error;

use super::file::ConfigFileError;
use super::parser::{invalid, overlay_search, parse_number};
use super::settings::SearchSettings;
use crate::coord::{BoundingBox, CoordError};
use crate::scan::ScanConfig;

/// Output file name used when a profile doesn't set one.
pub const DEFAULT_OUTPUT_FILENAME: &str = "panoramas.txt";

/// Errors raised while loading a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    Read(#[from] ini::Error),

    #[error("Profile is missing the [{0}] section")]
    MissingSection(&'static str),

    #[error("Profile is missing {section}.{key}")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error(transparent)]
    InvalidValue(#[from] ConfigFileError),

    #[error("Profile area is invalid: {0}")]
    InvalidArea(#[from] CoordError),

    #[error("Unknown city '{name}'. Available: {available}")]
    UnknownCity { name: String, available: String },
}

/// A named area plus the parameters to scan it with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProfile {
    pub name: String,
    pub description: Option<String>,
    pub bounds: BoundingBox,
    pub search: SearchSettings,
    /// Link file name; the detail report and JSON export derive from it
    pub output_filename: String,
}

impl ScanProfile {
    /// Scan parameters of this profile.
    pub fn scan_config(&self) -> ScanConfig {
        self.search.scan_config()
    }

    /// Loads a profile from an INI file. The profile is named after the file stem.
    pub fn load_from(path: &Path) -> Result<Self, ProfileError> {
        let ini = Ini::load_from_file(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());
        Self::from_ini(name, &ini)
    }

    /// Builds a profile from parsed INI content.
    pub fn from_ini(name: impl Into<String>, ini: &Ini) -> Result<Self, ProfileError> {
        let bounds_section = ini
            .section(Some("bounds"))
            .ok_or(ProfileError::MissingSection("bounds"))?;
        let search_section = ini
            .section(Some("search"))
            .ok_or(ProfileError::MissingSection("search"))?;
        let output_section = ini
            .section(Some("output"))
            .ok_or(ProfileError::MissingSection("output"))?;

        let bound = |key: &'static str| -> Result<f64, ProfileError> {
            let value = bounds_section.get(key).ok_or(ProfileError::MissingKey {
                section: "bounds",
                key,
            })?;
            Ok(parse_number("bounds", key, value)?)
        };
        let bounds = BoundingBox::new(
            bound("lat_min")?,
            bound("lat_max")?,
            bound("lon_min")?,
            bound("lon_max")?,
        )?;

        let mut search = SearchSettings::default();
        overlay_search(search_section, "search", &mut search)?;

        let output_filename = match output_section.get("filename").map(str::trim) {
            Some("") => {
                return Err(invalid("output", "filename", "", "must not be empty").into());
            }
            Some(v) => v.to_string(),
            None => DEFAULT_OUTPUT_FILENAME.to_string(),
        };

        Ok(Self {
            name: name.into(),
            description: output_section
                .get("description")
                .or_else(|| bounds_section.get("description"))
                .map(String::from),
            bounds,
            search,
            output_filename,
        })
    }
}

/// A built-in city preset.
struct CityPreset {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    bounds: (f64, f64, f64, f64),
    step_km: f64,
    search_radius: u32,
    max_points: usize,
    delay: f64,
}

const CITY_PRESETS: [CityPreset; 2] = [
    CityPreset {
        id: "syktyvkar",
        name: "Syktyvkar",
        description: "Capital of the Komi Republic, Russia",
        bounds: (61.66, 61.69, 50.81, 50.86),
        step_km: 0.12,
        search_radius: 50,
        max_points: 800,
        delay: 0.03,
    },
    CityPreset {
        id: "moscow_center",
        name: "Moscow (center)",
        description: "Central Moscow",
        bounds: (55.75, 55.78, 37.60, 37.65),
        step_km: 0.15,
        search_radius: 80,
        max_points: 1500,
        delay: 0.02,
    },
];

impl CityPreset {
    fn to_profile(&self) -> Result<ScanProfile, ProfileError> {
        let (lat_min, lat_max, lon_min, lon_max) = self.bounds;
        Ok(ScanProfile {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            bounds: BoundingBox::new(lat_min, lat_max, lon_min, lon_max)?,
            search: SearchSettings {
                step_km: self.step_km,
                search_radius: self.search_radius,
                max_points: self.max_points,
                delay: self.delay,
            },
            output_filename: format!("{}_panoramas.txt", self.id),
        })
    }
}

/// Identifiers of the built-in city presets.
pub fn city_ids() -> Vec<&'static str> {
    CITY_PRESETS.iter().map(|c| c.id).collect()
}

/// All built-in city presets as `(id, profile)` pairs.
pub fn city_presets() -> Result<Vec<(&'static str, ScanProfile)>, ProfileError> {
    CITY_PRESETS
        .iter()
        .map(|c| c.to_profile().map(|p| (c.id, p)))
        .collect()
}

/// Looks up a built-in city preset by identifier (case-insensitive).
pub fn city_profile(id: &str) -> Result<ScanProfile, ProfileError> {
    let wanted = id.trim().to_lowercase();
    CITY_PRESETS
        .iter()
        .find(|c| c.id == wanted)
        .ok_or_else(|| ProfileError::UnknownCity {
            name: id.to_string(),
            available: city_ids().join(", "),
        })?
        .to_profile()
}

//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use panohunter::config::{city_profile, ConfigFile, ScanProfile, SearchSettings};
use panohunter::coord::BoundingBox;
use panohunter::scan::ScanConfig;

use crate::error::CliError;

/// Scan area as given on the command line.
#[derive(Debug, Default, Clone)]
pub struct AreaArgs {
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub profile: Option<PathBuf>,
    pub city: Option<String>,
}

/// Search parameter overrides from the command line.
#[derive(Debug, Default, Clone)]
pub struct SearchArgs {
    pub step_km: Option<f64>,
    pub search_radius: Option<u32>,
    pub max_points: Option<usize>,
    pub delay: Option<f64>,
}

/// Area and parameters a command will work on.
#[derive(Debug, Clone)]
pub struct ResolvedArea {
    /// Display name (profile or city name, or "custom area")
    pub name: String,
    pub description: Option<String>,
    pub bounds: BoundingBox,
    /// Parameters after applying profile and flag overrides
    pub search: SearchSettings,
    /// Default link file name for this area
    pub output_filename: String,
}

impl ResolvedArea {
    pub fn scan_config(&self) -> ScanConfig {
        self.search.scan_config()
    }

    fn from_profile(profile: ScanProfile) -> Self {
        Self {
            name: profile.name,
            description: profile.description,
            bounds: profile.bounds,
            search: profile.search,
            output_filename: profile.output_filename,
        }
    }
}

/// Resolves the scan area.
///
/// Sources, in order: `--profile FILE`, a bounding box from the four
/// coordinate flags, `--city NAME` as a built-in preset. With a bounding box,
/// `--city` only names the output files. Search parameters start from the
/// profile (or config.ini) and flags override them.
pub fn resolve_area(
    area: &AreaArgs,
    search: &SearchArgs,
    config: &ConfigFile,
) -> Result<ResolvedArea, CliError> {
    let mut resolved = if let Some(path) = &area.profile {
        if has_any_bound(area) {
            return Err(CliError::Area(
                "--profile cannot be combined with coordinate flags".to_string(),
            ));
        }
        ResolvedArea::from_profile(ScanProfile::load_from(path)?)
    } else if has_any_bound(area) {
        let bounds = BoundingBox::new(
            require_bound(area.lat_min, "--lat-min")?,
            require_bound(area.lat_max, "--lat-max")?,
            require_bound(area.lon_min, "--lon-min")?,
            require_bound(area.lon_max, "--lon-max")?,
        )
        .map_err(|e| CliError::Area(e.to_string()))?;
        let (name, output_filename) = match &area.city {
            Some(city) => (city.clone(), format!("{}_panoramas.txt", file_safe(city))),
            None => (
                "custom area".to_string(),
                panohunter::config::DEFAULT_OUTPUT_FILENAME.to_string(),
            ),
        };
        ResolvedArea {
            name,
            description: None,
            bounds,
            search: config.search.clone(),
            output_filename,
        }
    } else if let Some(city) = &area.city {
        ResolvedArea::from_profile(city_profile(city)?)
    } else {
        return Err(CliError::Area(
            "specify --lat-min/--lat-max/--lon-min/--lon-max, --profile FILE, or --city NAME"
                .to_string(),
        ));
    };

    apply_search_overrides(&mut resolved.search, search);
    Ok(resolved)
}

/// Applies command line overrides on top of `settings`.
pub fn apply_search_overrides(settings: &mut SearchSettings, args: &SearchArgs) {
    if let Some(v) = args.step_km {
        settings.step_km = v;
    }
    if let Some(v) = args.search_radius {
        settings.search_radius = v;
    }
    if let Some(v) = args.max_points {
        settings.max_points = v;
    }
    if let Some(v) = args.delay {
        settings.delay = v;
    }
}

fn has_any_bound(area: &AreaArgs) -> bool {
    area.lat_min.is_some() || area.lat_max.is_some() || area.lon_min.is_some() || area.lon_max.is_some()
}

fn require_bound(value: Option<f64>, flag: &str) -> Result<f64, CliError> {
    value.ok_or_else(|| CliError::Area(format!("{} is required with a bounding box", flag)))
}

/// Replaces characters that don't belong in file names.
fn file_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Resolves the API key: command line first, then config.ini.
pub fn resolve_api_key(flag: Option<String>, config: &ConfigFile) -> Result<String, CliError> {
    flag.filter(|k| !k.trim().is_empty())
        .or_else(|| config.api.key.clone())
        .ok_or(CliError::MissingApiKey)
}

/// Resolves the link file path.
///
/// An explicit `--output` is used as given; otherwise the area's file name
/// goes into the configured output directory.
pub fn resolve_output_path(output: Option<&Path>, area: &ResolvedArea, config: &ConfigFile) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => config.output.directory.join(&area.output_filename),
    }
}

/// Masks all but the first and last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format a duration in compact form.
///
/// Returns strings like "5s", "2m30s", "1h15m".
pub fn format_duration_compact(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Prints the area banner shared by `scan` and `estimate`.
pub fn print_area(area: &ResolvedArea) {
    let b = &area.bounds;
    let (width_km, height_km) = panohunter::coord::area_size_km(b);

    println!("Area: {}", area.name);
    if let Some(description) = &area.description {
        println!("  {}", description);
    }
    println!("  Latitude:   {:.5} → {:.5}", b.lat_min(), b.lat_max());
    println!("  Longitude:  {:.5} → {:.5}", b.lon_min(), b.lon_max());
    println!(
        "  Size:       {:.3}° × {:.3}° (~{:.2} km × {:.2} km)",
        b.lat_span(),
        b.lon_span(),
        width_km,
        height_km
    );
    println!("Parameters:");
    println!(
        "  Grid step:     {} km (~{:.0} m)",
        area.search.step_km,
        area.search.step_km * 1000.0
    );
    println!("  Search radius: {} m", area.search.search_radius);
    println!("  Max points:    {}", area.search.max_points);
    println!("  Delay:         {} s", area.search.delay);
}

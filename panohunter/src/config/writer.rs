//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config.api.key.as_deref().unwrap_or("");
    let json = if config.output.json { "true" } else { "false" };

    format!(
        r#"[api]
; Street View Static API key
; Get one at: https://console.cloud.google.com (enable Street View Static API)
; Metadata requests are free of charge but count against the request quota
key = {}

[search]
; Distance between grid points in kilometers (default: 0.15)
; Smaller steps find more panoramas but need more requests
step_km = {}
; Radius the service searches around each grid point, in meters (default: 50)
search_radius = {}
; Maximum number of grid points probed per scan (default: 1000)
max_points = {}
; Pause between requests in seconds (default: 0.03)
delay = {}

[output]
; Directory result files are written to (default: current directory)
directory = {}
; Maps domain used in panorama links, e.g. google.com, google.ru (default: google.de)
link_domain = {}
; Also write a JSON export next to the CSV report (default: false)
json = {}

[logging]
; Log file location (default: ~/.panohunter/panohunter.log)
file = {}
"#,
        api_key,
        config.search.step_km,
        config.search.search_radius,
        config.search.max_points,
        config.search.delay,
        path_to_string(&config.output.directory),
        config.output.link_domain,
        json,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

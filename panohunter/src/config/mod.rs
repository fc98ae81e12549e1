//! Configuration
//!
//! User settings live in `~/.panohunter/config.ini`:
//!
//! ```ini
//! [api]
//! key = AIza...
//!
//! [search]
//! step_km = 0.15
//! search_radius = 50
//! max_points = 1000
//! delay = 0.03
//!
//! [output]
//! directory = .
//! link_domain = google.de
//! json = false
//!
//! [logging]
//! file = ~/.panohunter/panohunter.log
//! ```
//!
//! A missing file means defaults. Scan profiles ([`ScanProfile`]) describe
//! one area each and come from separate INI files or built-in city presets.

mod defaults;
mod file;
mod keys;
mod parser;
mod profile;
mod settings;
mod writer;

pub use defaults::{default_log_file, DEFAULT_LOG_FILE_NAME, DEFAULT_OUTPUT_DIRECTORY};
pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use profile::{
    city_ids, city_presets, city_profile, ProfileError, ScanProfile, DEFAULT_OUTPUT_FILENAME,
};
pub use settings::{ApiSettings, LoggingSettings, OutputSettings, SearchSettings};

//! PanoHunter CLI - Command-line interface
//!
//! Scans a geographic area for Street View panoramas and writes the
//! discovered panoramas as viewer links plus a CSV report.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use commands::common::{AreaArgs, SearchArgs};
use commands::config::ConfigCommands;
use commands::estimate::EstimateArgs;
use commands::key::KeyArgs;
use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "panohunter")]
#[command(version = panohunter::VERSION)]
#[command(about = "Find Street View panoramas on a grid over a geographic area", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an area and save the panoramas found
    Scan {
        #[command(flatten)]
        area: AreaFlags,

        #[command(flatten)]
        search: SearchFlags,

        /// Street View API key (defaults to api.key from config.ini)
        #[arg(long)]
        api_key: Option<String>,

        /// Link file path; the CSV report is written next to it
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also write a JSON export with statistics
        #[arg(long)]
        json: bool,

        /// Check the API key against reference locations before scanning
        #[arg(long)]
        verify_key: bool,

        /// Scan even when the key check gets no answer
        #[arg(long, requires = "verify_key")]
        allow_unverified_key: bool,

        /// Mirror debug logs to stderr
        #[arg(long)]
        debug: bool,
    },

    /// Show grid size and minimum duration for an area without scanning
    Estimate {
        #[command(flatten)]
        area: AreaFlags,

        #[command(flatten)]
        search: SearchFlags,
    },

    /// Verify that an API key can query panorama metadata
    CheckKey {
        /// Street View API key (defaults to api.key from config.ini)
        #[arg(long)]
        api_key: Option<String>,

        /// Mirror debug logs to stderr
        #[arg(long)]
        debug: bool,
    },

    /// List built-in city presets
    Cities,

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Area selection flags.
#[derive(Args)]
struct AreaFlags {
    /// Southern latitude of the area
    #[arg(long, allow_hyphen_values = true)]
    lat_min: Option<f64>,

    /// Northern latitude of the area
    #[arg(long, allow_hyphen_values = true)]
    lat_max: Option<f64>,

    /// Western longitude of the area
    #[arg(long, allow_hyphen_values = true)]
    lon_min: Option<f64>,

    /// Eastern longitude of the area
    #[arg(long, allow_hyphen_values = true)]
    lon_max: Option<f64>,

    /// Scan profile INI file with [bounds] and optional [search]/[output]
    #[arg(long, conflicts_with = "city")]
    profile: Option<PathBuf>,

    /// Built-in city preset, or the output name for a custom bounding box
    #[arg(long)]
    city: Option<String>,
}

impl From<AreaFlags> for AreaArgs {
    fn from(f: AreaFlags) -> Self {
        AreaArgs {
            lat_min: f.lat_min,
            lat_max: f.lat_max,
            lon_min: f.lon_min,
            lon_max: f.lon_max,
            profile: f.profile,
            city: f.city,
        }
    }
}

/// Search parameter flags; unset flags fall back to profile or config.ini.
#[derive(Args)]
struct SearchFlags {
    /// Grid step in kilometers
    #[arg(long)]
    step_km: Option<f64>,

    /// Metadata search radius in meters
    #[arg(long)]
    search_radius: Option<u32>,

    /// Maximum number of grid points to probe
    #[arg(long)]
    max_points: Option<usize>,

    /// Pause between requests in seconds
    #[arg(long)]
    delay: Option<f64>,
}

impl From<SearchFlags> for SearchArgs {
    fn from(f: SearchFlags) -> Self {
        SearchArgs {
            step_km: f.step_km,
            search_radius: f.search_radius,
            max_points: f.max_points,
            delay: f.delay,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            area,
            search,
            api_key,
            output,
            json,
            verify_key,
            allow_unverified_key,
            debug,
        } => commands::scan::run(ScanArgs {
            area: area.into(),
            search: search.into(),
            api_key,
            output,
            json,
            verify_key,
            allow_unverified_key,
            debug,
        }),
        Commands::Estimate { area, search } => commands::estimate::run(EstimateArgs {
            area: area.into(),
            search: search.into(),
        }),
        Commands::CheckKey { api_key, debug } => commands::key::run(KeyArgs { api_key, debug }),
        Commands::Cities => commands::cities::run(),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

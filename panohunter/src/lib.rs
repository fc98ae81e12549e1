//! PanoHunter - Street View panorama discovery over a geographic grid
//!
//! Scans a bounding box on a uniform grid, asks the Street View metadata
//! service for the nearest panorama at every point, and keeps each panorama
//! once. Results are written as a list of viewer links plus a CSV report.
//!
//! # Example
//!
//! ```ignore
//! use panohunter::coord::BoundingBox;
//! use panohunter::probe::{ReqwestClient, StreetViewProbe};
//! use panohunter::report::FileResultWriter;
//! use panohunter::scan::{ScanConfig, ScanEngine};
//!
//! let probe = StreetViewProbe::new(ReqwestClient::new()?, api_key);
//! let engine = ScanEngine::new(probe, FileResultWriter::new("panoramas.txt"));
//!
//! let bbox = BoundingBox::new(61.66, 61.69, 50.81, 50.86)?;
//! let stats = engine.search_area(bbox, &ScanConfig::default())?;
//! println!("{} panoramas", stats.found_count);
//! ```

pub mod collector;
pub mod config;
pub mod coord;
pub mod grid;
pub mod link;
pub mod logging;
pub mod probe;
pub mod report;
pub mod scan;

/// Version of the PanoHunter library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

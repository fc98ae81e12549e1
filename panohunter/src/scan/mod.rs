//! Grid scanning
//!
//! [`ScanEngine`] walks the grid of a bounding box, probes every point, keeps
//! the first record per panorama, and writes the result set when the scan
//! ends. A scan moves through `Initialized → Running → Completed`; an
//! interrupt completes it early with whatever was collected.

mod config;
mod engine;
mod error;
mod session;
mod stats;

pub use config::{
    ScanConfig, DEFAULT_DELAY_S, DEFAULT_MAX_POINTS, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_SEARCH_RADIUS_M, DEFAULT_STEP_KM,
};
pub use engine::ScanEngine;
pub use error::ScanError;
pub use session::{ScanSession, ScanState};
pub use stats::{CompletionKind, ScanProgress, ScanProgressCallback, ScanStatistics};

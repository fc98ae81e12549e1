//! Scan error types

use thiserror::Error;

use crate::coord::CoordError;
use crate::report::ReportError;

/// Errors that end a scan.
///
/// Per-point failures (rate limiting, transport errors) never surface here;
/// they are counted in the statistics and the scan moves on.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Bounding box or step rejected before any network activity
    #[error("Invalid area: {0}")]
    InvalidArea(#[from] CoordError),

    /// A scan parameter is out of range
    #[error("Invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Collected results could not be persisted
    #[error("Failed to write results: {0}")]
    Report(#[from] ReportError),
}

impl ScanError {
    /// Returns `true` for errors raised before the scan started.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScanError::InvalidArea(_) | ScanError::InvalidConfig { .. })
    }
}

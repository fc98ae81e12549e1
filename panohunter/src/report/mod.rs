//! Result persistence
//!
//! A finished scan hands its records to a [`ResultSink`]. The file writer
//! produces three artifacts from one output stem:
//!
//! - `<stem>.txt`: one viewer link per panorama, in discovery order
//! - `<stem>_details.csv`: one row per panorama
//! - `<stem>.json`: optional JSON dump of records and statistics
//!
//! Nothing is written, and no file is created, when the scan found nothing.

mod summary;
mod writer;

pub use summary::ResultSummary;
pub use writer::{FileResultWriter, DETAIL_COLUMNS};

use std::path::PathBuf;

use thiserror::Error;

use crate::collector::PanoramaRecord;
use crate::scan::ScanStatistics;

/// Errors raised while persisting results.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write detail report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON export: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for the records of a finished scan.
pub trait ResultSink {
    /// Persists `records` in the given order.
    ///
    /// Returns `Ok(None)` without touching any output when `records` is empty.
    fn write_results(
        &self,
        records: &[PanoramaRecord],
        stats: &ScanStatistics,
    ) -> Result<Option<ResultSummary>, ReportError>;
}

impl<S: ResultSink + ?Sized> ResultSink for &S {
    fn write_results(
        &self,
        records: &[PanoramaRecord],
        stats: &ScanStatistics,
    ) -> Result<Option<ResultSummary>, ReportError> {
        (**self).write_results(records, stats)
    }
}

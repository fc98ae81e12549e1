//! Summary of written results

use std::collections::HashSet;
use std::path::PathBuf;

use crate::collector::PanoramaRecord;

/// What a sink wrote for a scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSummary {
    /// Number of panoramas written
    pub records: usize,
    /// Mean distance between a panorama and the grid point that found it
    pub avg_distance_m: f64,
    /// Distinct capture dates among records that report one
    pub unique_dates: usize,
    /// Files created, links first
    pub files: Vec<PathBuf>,
}

impl ResultSummary {
    /// Computes the summary figures for `records`. `files` is left empty.
    pub fn from_records(records: &[PanoramaRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total_distance: f64 = records.iter().map(|r| r.distance_from_origin_m).sum();
        let unique_dates = records
            .iter()
            .filter_map(|r| r.capture_date.as_deref())
            .collect::<HashSet<_>>()
            .len();

        Self {
            records: records.len(),
            avg_distance_m: total_distance / records.len() as f64,
            unique_dates,
            files: Vec::new(),
        }
    }
}

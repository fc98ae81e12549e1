//! Scan progress and final statistics

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::report::ResultSummary;

/// Progress callback invoked periodically during a scan.
pub type ScanProgressCallback = Arc<dyn Fn(&ScanProgress) + Send + Sync>;

/// Snapshot of a running scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgress {
    /// Points probed so far
    pub points_checked: usize,
    /// Points the scan will probe in total
    pub points_total: usize,
    /// Unique panoramas collected so far
    pub found: usize,
    /// Time since the scan started
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Fraction of the grid already probed, in percent.
    pub fn percent(&self) -> f64 {
        if self.points_total == 0 {
            return 100.0;
        }
        self.points_checked as f64 / self.points_total as f64 * 100.0
    }

    /// Observed probe throughput in points per second.
    pub fn points_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.points_checked as f64 / secs
        } else {
            0.0
        }
    }

    /// Estimated time to finish based on the observed throughput.
    ///
    /// `None` until at least one point has been probed in measurable time.
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.points_per_sec();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.points_total.saturating_sub(self.points_checked);
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// Every grid point was probed
    Exhausted,
    /// Stopped early by an interrupt; results are partial
    Interrupted,
}

/// Final statistics of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanStatistics {
    /// Grid points probed
    pub points_checked: usize,
    /// Unique panoramas collected
    pub found_count: usize,
    /// `found_count / points_checked`, 0 when nothing was probed
    pub efficiency_ratio: f64,
    /// Metadata requests issued
    pub request_count: u64,
    pub elapsed_seconds: f64,
    pub not_found: usize,
    pub rate_limited: usize,
    pub transport_failures: usize,
    /// Hits rejected because their panorama was already collected
    pub duplicates: usize,
    /// Grid size before truncation to `max_points`
    pub total_grid_points: usize,
    pub truncated: bool,
    pub completion: CompletionKind,
    /// What was written out; `None` when no panorama was found
    #[serde(skip)]
    pub output: Option<ResultSummary>,
}

impl ScanStatistics {
    /// Average probe throughput in points per second.
    pub fn points_per_sec(&self) -> f64 {
        if self.elapsed_seconds > 0.0 {
            self.points_checked as f64 / self.elapsed_seconds
        } else {
            0.0
        }
    }

    /// The scan ran but discovered nothing.
    pub fn found_nothing(&self) -> bool {
        self.found_count == 0
    }

    pub fn was_interrupted(&self) -> bool {
        self.completion == CompletionKind::Interrupted
    }

    /// Share of probes that hit the rate limit, in percent.
    pub fn rate_limited_percent(&self) -> f64 {
        if self.points_checked == 0 {
            0.0
        } else {
            self.rate_limited as f64 / self.points_checked as f64 * 100.0
        }
    }
}

//! Per-scan mutable state

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::stats::{CompletionKind, ScanProgress, ScanStatistics};
use crate::collector::{Acceptance, DeduplicatingCollector, PanoramaRecord};
use crate::coord::GridPoint;
use crate::probe::ProbeOutcome;

/// Lifecycle of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Initialized,
    Running,
    Completed(CompletionKind),
}

/// State owned by one `search_area` call.
///
/// Holds the de-duplication set, the collected records in discovery order,
/// and the outcome counters. A fresh session is created for every scan and
/// never shared.
#[derive(Debug)]
pub struct ScanSession {
    state: ScanState,
    collector: DeduplicatingCollector,
    records: Vec<PanoramaRecord>,
    points_total: usize,
    total_grid_points: usize,
    points_checked: usize,
    request_count: u64,
    not_found: usize,
    rate_limited: usize,
    transport_failures: usize,
    started_at: DateTime<Local>,
    clock: Option<Instant>,
    elapsed: Duration,
}

impl ScanSession {
    /// Creates a session that will probe `points_total` of `total_grid_points`.
    pub fn new(points_total: usize, total_grid_points: usize) -> Self {
        Self {
            state: ScanState::Initialized,
            collector: DeduplicatingCollector::new(),
            records: Vec::new(),
            points_total,
            total_grid_points,
            points_checked: 0,
            request_count: 0,
            not_found: 0,
            rate_limited: 0,
            transport_failures: 0,
            started_at: Local::now(),
            clock: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Moves to `Running` and starts the clock.
    pub fn start(&mut self) {
        if self.state == ScanState::Initialized {
            self.state = ScanState::Running;
            self.started_at = Local::now();
            self.clock = Some(Instant::now());
        }
    }

    /// Records the outcome of probing `point`.
    ///
    /// Returns the new record when the outcome produced a first sighting.
    pub fn record(&mut self, point: GridPoint, outcome: ProbeOutcome) -> Option<&PanoramaRecord> {
        self.points_checked += 1;
        self.request_count += 1;

        match outcome {
            ProbeOutcome::Found(hit) => match self.collector.accept(hit, point) {
                Acceptance::Accepted(record) => {
                    debug!(panorama_id = %record.panorama_id, origin = %point, "New panorama");
                    self.records.push(record);
                    return self.records.last();
                }
                Acceptance::Rejected { panorama_id } => {
                    debug!(%panorama_id, origin = %point, "Duplicate panorama");
                }
            },
            ProbeOutcome::NotFound => self.not_found += 1,
            ProbeOutcome::RateLimited => {
                self.rate_limited += 1;
                warn!(point = %point, "Rate limited by metadata service, continuing");
            }
            ProbeOutcome::TransportError(e) => {
                self.transport_failures += 1;
                debug!(point = %point, error = %e, "Probe failed");
            }
        }
        None
    }

    /// Moves to `Completed` and freezes the clock. Idempotent.
    pub fn complete(&mut self, kind: CompletionKind) {
        if let ScanState::Completed(_) = self.state {
            return;
        }
        self.elapsed = self.running_time();
        self.state = ScanState::Completed(kind);
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, ScanState::Completed(_))
    }

    /// Collected records in discovery order.
    pub fn records(&self) -> &[PanoramaRecord] {
        &self.records
    }

    pub fn points_checked(&self) -> usize {
        self.points_checked
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Wall-clock time the scan started.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    fn running_time(&self) -> Duration {
        match (self.state, self.clock) {
            (ScanState::Completed(_), _) => self.elapsed,
            (_, Some(clock)) => clock.elapsed(),
            (_, None) => Duration::ZERO,
        }
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            points_checked: self.points_checked,
            points_total: self.points_total,
            found: self.records.len(),
            elapsed: self.running_time(),
        }
    }

    /// Statistics for the session so far.
    ///
    /// A session that is still running reports itself as interrupted.
    pub fn statistics(&self) -> ScanStatistics {
        let found_count = self.records.len();
        let efficiency_ratio = if self.points_checked > 0 {
            found_count as f64 / self.points_checked as f64
        } else {
            0.0
        };
        let completion = match self.state {
            ScanState::Completed(kind) => kind,
            _ => CompletionKind::Interrupted,
        };

        ScanStatistics {
            points_checked: self.points_checked,
            found_count,
            efficiency_ratio,
            request_count: self.request_count,
            elapsed_seconds: self.running_time().as_secs_f64(),
            not_found: self.not_found,
            rate_limited: self.rate_limited,
            transport_failures: self.transport_failures,
            duplicates: self.collector.duplicates(),
            total_grid_points: self.total_grid_points,
            truncated: self.total_grid_points > self.points_total,
            completion,
            output: None,
        }
    }
}

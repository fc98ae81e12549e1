//! The scan loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{error, info, warn};

use super::config::{ScanConfig, DEFAULT_PROGRESS_INTERVAL};
use super::error::ScanError;
use super::session::ScanSession;
use super::stats::{CompletionKind, ScanProgressCallback, ScanStatistics};
use crate::config::ScanProfile;
use crate::coord::BoundingBox;
use crate::grid::GeoGrid;
use crate::probe::PanoramaProbe;
use crate::report::ResultSink;

/// Drives grid points through a probe and hands the collected panoramas to a sink.
///
/// The engine is strictly sequential: one probe in flight, a fixed blocking
/// pause between consecutive probes, and a cancellation flag checked before
/// every point. Collected results are written on normal completion, on
/// interrupt, and if the scan unwinds from a panic.
///
/// # Example
///
/// ```ignore
/// use panohunter::coord::BoundingBox;
/// use panohunter::probe::{ReqwestClient, StreetViewProbe};
/// use panohunter::report::FileResultWriter;
/// use panohunter::scan::{ScanConfig, ScanEngine};
///
/// let probe = StreetViewProbe::new(ReqwestClient::new()?, api_key);
/// let writer = FileResultWriter::new("panoramas.txt");
/// let engine = ScanEngine::new(probe, writer);
///
/// let bbox = BoundingBox::new(61.66, 61.69, 50.81, 50.86)?;
/// let stats = engine.search_area(bbox, &ScanConfig::default())?;
/// ```
pub struct ScanEngine<P: PanoramaProbe, S: ResultSink> {
    probe: P,
    sink: S,
    cancel: Arc<AtomicBool>,
    progress: Option<ScanProgressCallback>,
    progress_interval: usize,
}

impl<P: PanoramaProbe, S: ResultSink> ScanEngine<P, S> {
    pub fn new(probe: P, sink: S) -> Self {
        Self {
            probe,
            sink,
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Shares an externally owned cancellation flag (e.g. set by a Ctrl+C handler).
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Registers a callback invoked every `progress_interval` points.
    pub fn with_progress(mut self, callback: ScanProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Sets how many points pass between progress reports. Zero disables them.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Handle to the cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Scans `bbox` with the given parameters.
    ///
    /// Fails only on invalid parameters (before any request) or when the
    /// results cannot be written. Per-point failures are counted in the
    /// returned statistics.
    pub fn search_area(&self, bbox: BoundingBox, config: &ScanConfig) -> Result<ScanStatistics, ScanError> {
        config.validate()?;
        let grid = GeoGrid::new(bbox, config.step_km())?;

        let total_grid_points = grid.point_count();
        let points_total = total_grid_points.min(config.max_points());
        if points_total < total_grid_points {
            warn!(
                total_grid_points,
                max_points = config.max_points(),
                "Grid truncated to max_points"
            );
        }

        info!(
            lat_min = bbox.lat_min(),
            lat_max = bbox.lat_max(),
            lon_min = bbox.lon_min(),
            lon_max = bbox.lon_max(),
            step_km = config.step_km(),
            search_radius_m = config.search_radius_m(),
            points = points_total,
            "Starting scan"
        );

        let mut guard = FlushGuard::new(ScanSession::new(points_total, total_grid_points), &self.sink);
        guard.session.start();

        let delay = config.delay();
        let mut completion = CompletionKind::Exhausted;

        for (index, point) in grid.points().take(points_total).enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!(points_checked = index, "Scan interrupted");
                completion = CompletionKind::Interrupted;
                break;
            }

            if index > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }

            let outcome = self.probe.probe(point, config.search_radius_m());
            if let Some(record) = guard.session.record(point, outcome) {
                info!(
                    panorama_id = %record.panorama_id,
                    lat = record.exact_lat,
                    lng = record.exact_lng,
                    distance_m = %format!("{:.1}", record.distance_from_origin_m),
                    "Found panorama"
                );
            }

            if self.progress_interval > 0 && (index + 1) % self.progress_interval == 0 {
                self.report_progress(&guard.session);
            }
        }

        guard.session.complete(completion);
        let stats = guard.finish()?;

        info!(
            points_checked = stats.points_checked,
            found = stats.found_count,
            rate_limited = stats.rate_limited,
            failures = stats.transport_failures,
            elapsed_s = %format!("{:.1}", stats.elapsed_seconds),
            "Scan complete"
        );
        Ok(stats)
    }

    /// Scans the box given by raw coordinates.
    ///
    /// Builds and validates the [`BoundingBox`] and [`ScanConfig`] first.
    #[allow(clippy::too_many_arguments)]
    pub fn search_area_raw(
        &self,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        step_km: f64,
        search_radius_m: u32,
        max_points: usize,
        delay_s: f64,
    ) -> Result<ScanStatistics, ScanError> {
        let bbox = BoundingBox::new(lat_min, lat_max, lon_min, lon_max)?;
        let config = ScanConfig::new()
            .with_step_km(step_km)
            .with_search_radius_m(search_radius_m)
            .with_max_points(max_points)
            .with_delay_s(delay_s);
        self.search_area(bbox, &config)
    }

    /// Scans the area described by a profile.
    pub fn search_from_config(&self, profile: &ScanProfile) -> Result<ScanStatistics, ScanError> {
        self.search_area(profile.bounds, &profile.scan_config())
    }

    fn report_progress(&self, session: &ScanSession) {
        let progress = session.progress();
        info!(
            points = progress.points_checked,
            total = progress.points_total,
            percent = %format!("{:.1}", progress.percent()),
            found = progress.found,
            points_per_sec = %format!("{:.1}", progress.points_per_sec()),
            eta_s = progress.eta().map(|d| d.as_secs()),
            "Scan progress"
        );
        if let Some(callback) = &self.progress {
            callback(&progress);
        }
    }
}

/// Owns the session for the duration of the loop and writes whatever was
/// collected if the loop unwinds before [`finish`](Self::finish).
struct FlushGuard<'a, S: ResultSink> {
    session: ScanSession,
    sink: &'a S,
    flushed: bool,
}

impl<'a, S: ResultSink> FlushGuard<'a, S> {
    fn new(session: ScanSession, sink: &'a S) -> Self {
        Self {
            session,
            sink,
            flushed: false,
        }
    }

    fn finish(mut self) -> Result<ScanStatistics, ScanError> {
        self.flushed = true;
        let mut stats = self.session.statistics();
        stats.output = self.sink.write_results(self.session.records(), &stats)?;
        Ok(stats)
    }
}

impl<S: ResultSink> Drop for FlushGuard<'_, S> {
    fn drop(&mut self) {
        if self.flushed || self.session.records().is_empty() {
            return;
        }

        self.session.complete(CompletionKind::Interrupted);
        let stats = self.session.statistics();
        match self.sink.write_results(self.session.records(), &stats) {
            Ok(_) => warn!(
                records = stats.found_count,
                "Scan aborted, partial results written"
            ),
            Err(e) => error!(error = %e, "Scan aborted and partial results could not be written"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::PanoramaRecord;
    use crate::coord::GridPoint;
    use crate::probe::{HttpError, PanoramaHit, ProbeError, ProbeOutcome};
    use crate::report::{ReportError, ResultSummary};
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Probe answering from a closure keyed by call index.
    struct FnProbe<F: Fn(usize, GridPoint) -> ProbeOutcome> {
        respond: F,
        calls: RefCell<Vec<GridPoint>>,
    }

    impl<F: Fn(usize, GridPoint) -> ProbeOutcome> FnProbe<F> {
        fn new(respond: F) -> Self {
            Self {
                respond,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl<F: Fn(usize, GridPoint) -> ProbeOutcome> PanoramaProbe for FnProbe<F> {
        fn probe(&self, point: GridPoint, _radius_m: u32) -> ProbeOutcome {
            let index = self.calls.borrow().len();
            self.calls.borrow_mut().push(point);
            (self.respond)(index, point)
        }
    }

    /// Sink keeping every batch it was given.
    #[derive(Default)]
    struct MemorySink {
        batches: Mutex<Vec<Vec<PanoramaRecord>>>,
    }

    impl MemorySink {
        fn batches(&self) -> Vec<Vec<PanoramaRecord>> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl ResultSink for MemorySink {
        fn write_results(
            &self,
            records: &[PanoramaRecord],
            _stats: &ScanStatistics,
        ) -> Result<Option<ResultSummary>, ReportError> {
            if records.is_empty() {
                return Ok(None);
            }
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(Some(ResultSummary::from_records(records)))
        }
    }

    fn found(id: &str) -> ProbeOutcome {
        ProbeOutcome::Found(PanoramaHit {
            panorama_id: id.to_string(),
            lat: 61.665,
            lng: 50.835,
            capture_date: None,
            attribution: None,
        })
    }

    /// 72-point grid at step 0.1 km.
    fn small_box() -> BoundingBox {
        BoundingBox::new(61.66, 61.67, 50.83, 50.84).unwrap()
    }

    fn fast_config() -> ScanConfig {
        ScanConfig::new().with_step_km(0.1).with_delay_s(0.0)
    }

    #[test]
    fn test_rate_limit_does_not_stop_scan() {
        let probe = FnProbe::new(|i, _| match i {
            2 => ProbeOutcome::RateLimited,
            3 => found("D"),
            4 => found("E"),
            _ => ProbeOutcome::NotFound,
        });
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &fast_config().with_max_points(5))
            .unwrap();

        assert_eq!(engine.probe().call_count(), 5);
        assert_eq!(stats.points_checked, 5);
        assert_eq!(stats.rate_limited, 1);
        assert_eq!(stats.found_count, 2);
        assert_eq!(stats.completion, CompletionKind::Exhausted);

        let ids: Vec<_> = engine.sink().batches()[0]
            .iter()
            .map(|r| r.panorama_id.clone())
            .collect();
        assert_eq!(ids, vec!["D", "E"]);
    }

    #[test]
    fn test_transport_errors_are_counted() {
        let probe = FnProbe::new(|i, _| {
            if i % 2 == 0 {
                ProbeOutcome::TransportError(ProbeError::Http(HttpError::Transport("reset".into())))
            } else {
                ProbeOutcome::NotFound
            }
        });
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &fast_config().with_max_points(4))
            .unwrap();

        assert_eq!(stats.transport_failures, 2);
        assert_eq!(stats.not_found, 2);
        assert_eq!(stats.points_checked, 4);
    }

    #[test]
    fn test_no_discoveries_writes_nothing() {
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine.search_area(small_box(), &fast_config()).unwrap();

        assert_eq!(stats.found_count, 0);
        assert!(stats.found_nothing());
        assert!(stats.output.is_none());
        assert_eq!(stats.completion, CompletionKind::Exhausted);
        assert!(engine.sink().batches().is_empty());
    }

    #[test]
    fn test_truncation_probes_first_points() {
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &fast_config().with_max_points(10))
            .unwrap();

        let expected: Vec<GridPoint> = GeoGrid::new(small_box(), 0.1).unwrap().generate()[..10].to_vec();
        assert_eq!(*engine.probe().calls.borrow(), expected);
        assert_eq!(stats.points_checked, 10);
        assert_eq!(stats.total_grid_points, 72);
        assert!(stats.truncated);
    }

    #[test]
    fn test_fine_step_with_small_max_points_starts_immediately() {
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default());
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let config = ScanConfig::new()
            .with_step_km(0.0005)
            .with_max_points(5)
            .with_delay_s(0.0);

        let started = std::time::Instant::now();
        let stats = engine.search_area(bbox, &config).unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(stats.points_checked, 5);
        assert!(stats.truncated);
        assert!(stats.total_grid_points > 40_000_000_000);
    }

    #[test]
    fn test_step_too_small_fails_before_probing() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();

        let err = engine
            .search_area(bbox, &fast_config().with_step_km(1e-15).with_max_points(5))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(engine.probe().call_count(), 0);
    }

    #[test]
    fn test_no_truncation_when_grid_fits() {
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine.search_area(small_box(), &fast_config()).unwrap();

        assert_eq!(stats.points_checked, 72);
        assert!(!stats.truncated);
    }

    #[test]
    fn test_duplicates_collapse() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &ScanConfig::new().with_step_km(0.5).with_delay_s(0.0))
            .unwrap();

        assert_eq!(stats.points_checked, 6);
        assert_eq!(stats.found_count, 1);
        assert_eq!(stats.duplicates, 5);
        assert_eq!(engine.sink().batches()[0].len(), 1);
    }

    #[test]
    fn test_interrupt_writes_partial_results() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let probe = FnProbe::new(move |i, _| {
            if i == 2 {
                flag.store(true, Ordering::SeqCst);
            }
            found(&format!("P{}", i))
        });
        let engine = ScanEngine::new(probe, MemorySink::default()).with_cancel_flag(cancel);

        let stats = engine.search_area(small_box(), &fast_config()).unwrap();

        assert_eq!(stats.points_checked, 3);
        assert_eq!(stats.completion, CompletionKind::Interrupted);
        assert!(stats.was_interrupted());
        assert_eq!(engine.sink().batches()[0].len(), 3);
    }

    #[test]
    fn test_cancelled_before_start_probes_nothing() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());
        engine.cancel_flag().store(true, Ordering::SeqCst);

        let stats = engine.search_area(small_box(), &fast_config()).unwrap();

        assert_eq!(engine.probe().call_count(), 0);
        assert_eq!(stats.completion, CompletionKind::Interrupted);
    }

    #[test]
    fn test_panic_flushes_collected_results() {
        let probe = FnProbe::new(|i, _| {
            if i == 2 {
                panic!("probe exploded");
            }
            found(&format!("P{}", i))
        });
        let sink = MemorySink::default();
        let engine = ScanEngine::new(probe, &sink);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.search_area(small_box(), &fast_config())
        }));

        assert!(result.is_err());
        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn test_invalid_config_fails_before_probing() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());

        let err = engine
            .search_area(small_box(), &fast_config().with_search_radius_m(0))
            .unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("search_radius_m"));
        assert_eq!(engine.probe().call_count(), 0);
    }

    #[test]
    fn test_raw_search_validates_box() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());

        let err = engine
            .search_area_raw(61.67, 61.66, 50.83, 50.84, 0.1, 50, 10, 0.0)
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidArea(_)));
        assert_eq!(engine.probe().call_count(), 0);
    }

    #[test]
    fn test_raw_search_single_point() {
        let probe = FnProbe::new(|_, _| found("X"));
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area_raw(61.66, 61.67, 50.83, 50.84, 2.0, 50, 100, 0.0)
            .unwrap();

        assert_eq!(stats.points_checked, 1);
        assert_eq!(*engine.probe().calls.borrow(), vec![GridPoint::new(61.66, 50.83)]);
    }

    #[test]
    fn test_progress_callback_interval() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink_reports = Arc::clone(&reports);
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default())
            .with_progress_interval(10)
            .with_progress(Arc::new(move |p| sink_reports.lock().unwrap().push(p.points_checked)));

        engine.search_area(small_box(), &fast_config()).unwrap();

        assert_eq!(*reports.lock().unwrap(), vec![10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn test_pacing_delay_between_probes() {
        let probe = FnProbe::new(|_, _| ProbeOutcome::NotFound);
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &fast_config().with_max_points(3).with_delay_s(0.02))
            .unwrap();

        // Two pauses separate three probes
        assert!(stats.elapsed_seconds >= Duration::from_millis(40).as_secs_f64());
    }

    #[test]
    fn test_summary_attached_to_statistics() {
        let probe = FnProbe::new(|i, _| if i == 0 { found("X") } else { ProbeOutcome::NotFound });
        let engine = ScanEngine::new(probe, MemorySink::default());

        let stats = engine
            .search_area(small_box(), &fast_config().with_max_points(3))
            .unwrap();

        assert_eq!(stats.output.unwrap().records, 1);
        assert!((stats.efficiency_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.request_count, 3);
    }
}

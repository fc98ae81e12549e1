//! Scan parameters

use std::time::Duration;

use super::error::ScanError;

/// Default grid step in kilometers.
pub const DEFAULT_STEP_KM: f64 = 0.15;

/// Default metadata search radius in meters.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 50;

/// Default cap on probed grid points.
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Default pause between consecutive probes in seconds.
pub const DEFAULT_DELAY_S: f64 = 0.03;

/// Points between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Parameters of one scan.
///
/// Built with the `with_*` methods and checked once by [`validate`](Self::validate)
/// when the scan starts.
///
/// # Example
///
/// ```
/// use panohunter::scan::ScanConfig;
///
/// let config = ScanConfig::new()
///     .with_step_km(0.12)
///     .with_max_points(800);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.search_radius_m(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    step_km: f64,
    search_radius_m: u32,
    max_points: usize,
    inter_request_delay_s: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            step_km: DEFAULT_STEP_KM,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            max_points: DEFAULT_MAX_POINTS,
            inter_request_delay_s: DEFAULT_DELAY_S,
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the distance between neighbouring grid points.
    pub fn with_step_km(mut self, step_km: f64) -> Self {
        self.step_km = step_km;
        self
    }

    /// Sets the radius the metadata service searches around each point.
    pub fn with_search_radius_m(mut self, radius_m: u32) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    /// Sets the maximum number of grid points probed.
    ///
    /// Longer grids are truncated to their first `max_points` points.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Sets the blocking pause between consecutive probes.
    pub fn with_delay_s(mut self, delay_s: f64) -> Self {
        self.inter_request_delay_s = delay_s;
        self
    }

    pub fn step_km(&self) -> f64 {
        self.step_km
    }

    pub fn search_radius_m(&self) -> u32 {
        self.search_radius_m
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn delay_s(&self) -> f64 {
        self.inter_request_delay_s
    }

    /// Pacing delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.inter_request_delay_s.max(0.0))
    }

    /// Checks every parameter, naming the first one out of range.
    pub fn validate(&self) -> Result<(), ScanError> {
        if !self.step_km.is_finite() || self.step_km <= 0.0 {
            return Err(ScanError::InvalidConfig {
                field: "step_km",
                reason: format!("must be a positive number, got {}", self.step_km),
            });
        }
        if self.search_radius_m == 0 {
            return Err(ScanError::InvalidConfig {
                field: "search_radius_m",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_points == 0 {
            return Err(ScanError::InvalidConfig {
                field: "max_points",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.inter_request_delay_s.is_finite() || self.inter_request_delay_s < 0.0 {
            return Err(ScanError::InvalidConfig {
                field: "delay_s",
                reason: format!("must be zero or positive, got {}", self.inter_request_delay_s),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: ScanConfig) -> &'static str {
        match config.validate() {
            Err(ScanError::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.step_km(), 0.15);
        assert_eq!(config.search_radius_m(), 50);
        assert_eq!(config.max_points(), 1000);
        assert_eq!(config.delay_s(), 0.03);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new()
            .with_step_km(0.5)
            .with_search_radius_m(80)
            .with_max_points(10)
            .with_delay_s(0.0);

        assert_eq!(config.step_km(), 0.5);
        assert_eq!(config.search_radius_m(), 80);
        assert_eq!(config.max_points(), 10);
        assert_eq!(config.delay(), Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_step() {
        assert_eq!(invalid_field(ScanConfig::new().with_step_km(0.0)), "step_km");
        assert_eq!(invalid_field(ScanConfig::new().with_step_km(-1.0)), "step_km");
        assert_eq!(invalid_field(ScanConfig::new().with_step_km(f64::NAN)), "step_km");
    }

    #[test]
    fn test_rejects_zero_radius() {
        assert_eq!(invalid_field(ScanConfig::new().with_search_radius_m(0)), "search_radius_m");
    }

    #[test]
    fn test_rejects_zero_max_points() {
        assert_eq!(invalid_field(ScanConfig::new().with_max_points(0)), "max_points");
    }

    #[test]
    fn test_rejects_negative_delay() {
        assert_eq!(invalid_field(ScanConfig::new().with_delay_s(-0.1)), "delay_s");
        assert_eq!(invalid_field(ScanConfig::new().with_delay_s(f64::INFINITY)), "delay_s");
    }

    #[test]
    fn test_error_names_field() {
        let err = ScanConfig::new().with_max_points(0).validate().unwrap_err();
        assert!(err.to_string().contains("max_points"));
        assert!(err.is_validation());
    }
}

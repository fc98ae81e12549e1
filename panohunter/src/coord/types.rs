//! Coordinate type definitions

use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Largest latitude or longitude span a bounding box may cover, in degrees.
///
/// Bounds the runtime of a single scan: a 10°×10° box at the default step
/// already produces millions of grid points.
pub const MAX_SPAN_DEG: f64 = 10.0;

/// Upper bound on grid points along one axis.
pub const MAX_AXIS_POINTS: usize = 1_000_000;

/// Flat-Earth approximation of one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// [`KM_PER_DEGREE`] expressed in meters.
pub const METERS_PER_DEGREE: f64 = KM_PER_DEGREE * 1000.0;

/// A single sample coordinate produced by the grid walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl GridPoint {
    /// Creates a new grid point.
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance in meters from this point to another coordinate.
    #[inline]
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        super::distance_m(self.lat, self.lon, lat, lon)
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

/// Rectangular latitude/longitude area to scan.
///
/// Construction validates every invariant, so a `BoundingBox` value is always
/// non-degenerate, inside the valid coordinate ranges, and at most
/// [`MAX_SPAN_DEG`] wide on either axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, naming the offending field.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self, CoordError> {
        check_latitude("lat_min", lat_min)?;
        check_latitude("lat_max", lat_max)?;
        check_longitude("lon_min", lon_min)?;
        check_longitude("lon_max", lon_max)?;

        if lat_min >= lat_max {
            return Err(CoordError::InvertedRange {
                axis: "lat",
                min: lat_min,
                max: lat_max,
            });
        }
        if lon_min >= lon_max {
            return Err(CoordError::InvertedRange {
                axis: "lon",
                min: lon_min,
                max: lon_max,
            });
        }

        let lat_span = lat_max - lat_min;
        if lat_span > MAX_SPAN_DEG {
            return Err(CoordError::SpanTooLarge {
                axis: "lat",
                span: lat_span,
            });
        }
        let lon_span = lon_max - lon_min;
        if lon_span > MAX_SPAN_DEG {
            return Err(CoordError::SpanTooLarge {
                axis: "lon",
                span: lon_span,
            });
        }

        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        })
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude span in degrees.
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Average latitude, used to scale longitude degrees to kilometers.
    pub fn mid_lat(&self) -> f64 {
        (self.lat_min + self.lat_max) / 2.0
    }

    /// Returns `true` if the point lies inside the box (edges inclusive).
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

fn check_latitude(field: &'static str, value: f64) -> Result<(), CoordError> {
    if (MIN_LAT..=MAX_LAT).contains(&value) {
        Ok(())
    } else {
        Err(CoordError::InvalidLatitude { field, value })
    }
}

fn check_longitude(field: &'static str, value: f64) -> Result<(), CoordError> {
    if (MIN_LON..=MAX_LON).contains(&value) {
        Ok(())
    } else {
        Err(CoordError::InvalidLongitude { field, value })
    }
}

/// Errors raised while validating geographic input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside -90..=90 (or not a number)
    #[error("Invalid latitude: {field}={value} (must be between -90 and 90)")]
    InvalidLatitude { field: &'static str, value: f64 },

    /// Longitude is outside -180..=180 (or not a number)
    #[error("Invalid longitude: {field}={value} (must be between -180 and 180)")]
    InvalidLongitude { field: &'static str, value: f64 },

    /// Minimum is not strictly below maximum
    #[error("{axis}_min ({min}) must be less than {axis}_max ({max})")]
    InvertedRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    /// Box is wider than [`MAX_SPAN_DEG`] on one axis
    #[error("{axis} span of {span:.2}° exceeds the 10° limit")]
    SpanTooLarge { axis: &'static str, span: f64 },

    /// Grid step is zero, negative, or not a number
    #[error("Invalid grid step: {0} km (must be a positive number)")]
    InvalidStep(f64),

    /// Grid step is so small that an axis would exceed [`MAX_AXIS_POINTS`]
    /// or the coordinate stops advancing
    #[error("Grid step of {0} km is too small for this area (more than 1000000 points per axis)")]
    StepTooSmall(f64),
}

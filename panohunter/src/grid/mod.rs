//! Uniform sample grid over a bounding box.
//!
//! The grid is walked in row-major order: latitude is the outer loop and
//! longitude the inner loop, both from min to max with inclusive upper bounds.
//! Step sizes are given in kilometers and converted to degrees with the
//! flat-Earth factors from [`crate::coord`], using the box's mid latitude for
//! the longitude step.
//!
//! # Example
//!
//! ```
//! use panohunter::coord::BoundingBox;
//! use panohunter::grid::GeoGrid;
//!
//! let bbox = BoundingBox::new(61.66, 61.67, 50.83, 50.84).unwrap();
//! let grid = GeoGrid::new(bbox, 2.0).unwrap();
//!
//! // A step larger than the box yields only the south-west corner
//! let points: Vec<_> = grid.points().collect();
//! assert_eq!(points.len(), 1);
//! assert_eq!(points[0].lat, 61.66);
//! assert_eq!(points[0].lon, 50.83);
//! ```

use crate::coord::{
    area_size_km, km_per_degree_lon, BoundingBox, CoordError, GridPoint, KM_PER_DEGREE,
    MAX_AXIS_POINTS,
};

/// A sample grid definition: box plus step sizes in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGrid {
    bbox: BoundingBox,
    step_km: f64,
    step_lat: f64,
    step_lon: f64,
    rows: usize,
    columns: usize,
}

impl GeoGrid {
    /// Creates a grid over `bbox` with points `step_km` apart.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::InvalidStep`] if `step_km` is not a positive,
    /// finite number, and [`CoordError::StepTooSmall`] if either axis would
    /// hold more than [`MAX_AXIS_POINTS`] points.
    pub fn new(bbox: BoundingBox, step_km: f64) -> Result<Self, CoordError> {
        if !(step_km.is_finite() && step_km > 0.0) {
            return Err(CoordError::InvalidStep(step_km));
        }

        let step_lat = step_km / KM_PER_DEGREE;
        let step_lon = step_km / km_per_degree_lon(bbox.mid_lat());

        let rows = axis_len(bbox.lat_min(), bbox.lat_max(), step_lat)
            .ok_or(CoordError::StepTooSmall(step_km))?;
        let columns = axis_len(bbox.lon_min(), bbox.lon_max(), step_lon)
            .ok_or(CoordError::StepTooSmall(step_km))?;

        Ok(Self {
            bbox,
            step_km,
            step_lat,
            step_lon,
            rows,
            columns,
        })
    }

    /// The box being sampled.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Step size in kilometers.
    pub fn step_km(&self) -> f64 {
        self.step_km
    }

    /// Latitude step in degrees.
    pub fn step_lat(&self) -> f64 {
        self.step_lat
    }

    /// Longitude step in degrees.
    pub fn step_lon(&self) -> f64 {
        self.step_lon
    }

    /// Returns a fresh iterator over the grid points.
    ///
    /// Every call starts from the south-west corner, so the grid can be
    /// walked any number of times with identical results.
    pub fn points(&self) -> GridPoints {
        GridPoints {
            grid: *self,
            lat: self.bbox.lat_min(),
            lon: self.bbox.lon_min(),
        }
    }

    /// Collects all grid points into a vector.
    pub fn generate(&self) -> Vec<GridPoint> {
        self.points().collect()
    }

    /// Number of latitude rows the walk visits.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of longitude columns in every row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Exact number of points the walk produces.
    pub fn point_count(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }
}

/// Counts the values `min, min + step, ...` up to `max` inclusive, using the
/// same repeated addition as [`GridPoints`].
///
/// `None` when the count exceeds [`MAX_AXIS_POINTS`] or the addition stops
/// advancing.
fn axis_len(min: f64, max: f64, step: f64) -> Option<usize> {
    let mut value = min;
    let mut count = 0;
    while value <= max {
        count += 1;
        if count > MAX_AXIS_POINTS {
            return None;
        }
        let next = value + step;
        if next <= value {
            return None;
        }
        value = next;
    }
    Some(count)
}

/// Iterator over the points of a [`GeoGrid`].
///
/// Coordinates advance by repeated addition of the degree step, matching the
/// row and column counts a simple nested loop would produce.
#[derive(Debug, Clone)]
pub struct GridPoints {
    grid: GeoGrid,
    lat: f64,
    lon: f64,
}

impl Iterator for GridPoints {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let bbox = &self.grid.bbox;
        if self.lat > bbox.lat_max() {
            return None;
        }

        let point = GridPoint::new(self.lat, self.lon);

        self.lon += self.grid.step_lon;
        if self.lon > bbox.lon_max() {
            self.lon = bbox.lon_min();
            self.lat += self.grid.step_lat;
        }

        Some(point)
    }
}

impl std::iter::FusedIterator for GridPoints {}

/// Convenience wrapper: every grid point of `bbox` at `step_km` spacing.
pub fn generate_grid(bbox: BoundingBox, step_km: f64) -> Result<Vec<GridPoint>, CoordError> {
    Ok(GeoGrid::new(bbox, step_km)?.generate())
}

/// Quick estimate of the grid size from the box dimensions.
///
/// Computes `(⌊width/step⌋ + 1) × (⌊height/step⌋ + 1)` without walking the
/// grid. May differ from [`GeoGrid::point_count`] by a row or column due to
/// floating point accumulation in the walk. Steps that would put more than
/// [`MAX_AXIS_POINTS`] on an axis are rejected like in [`GeoGrid::new`].
pub fn estimate_point_count(bbox: &BoundingBox, step_km: f64) -> Result<usize, CoordError> {
    if !(step_km.is_finite() && step_km > 0.0) {
        return Err(CoordError::InvalidStep(step_km));
    }

    let (width_km, height_km) = area_size_km(bbox);
    let columns = (width_km / step_km).floor() + 1.0;
    let rows = (height_km / step_km).floor() + 1.0;

    let limit = MAX_AXIS_POINTS as f64;
    if !(columns <= limit && rows <= limit) {
        return Err(CoordError::StepTooSmall(step_km));
    }

    (columns as usize)
        .checked_mul(rows as usize)
        .ok_or(CoordError::StepTooSmall(step_km))
}

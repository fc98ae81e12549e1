//! Geographic primitives
//!
//! Bounding boxes, grid points, and the flat-Earth conversions shared by the
//! grid generator and the distance calculation. The approximation treats one
//! degree of latitude as [`KM_PER_DEGREE`] kilometers and scales longitude by
//! the cosine of the latitude, which is accurate to well under a percent for
//! the sub-kilometer separations a scan deals with.

mod types;

pub use types::{
    BoundingBox, CoordError, GridPoint, KM_PER_DEGREE, MAX_AXIS_POINTS, MAX_LAT, MAX_LON, MAX_SPAN_DEG,
    METERS_PER_DEGREE, MIN_LAT, MIN_LON,
};

/// Kilometers covered by one degree of longitude at the given latitude.
#[inline]
pub fn km_per_degree_lon(lat: f64) -> f64 {
    KM_PER_DEGREE * lat.to_radians().cos()
}

/// Planar distance in meters between two coordinates.
///
/// Longitude deltas are scaled by the cosine of the mean latitude of the two
/// points. Only meaningful for points a few kilometers apart at most.
#[inline]
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = (lat1 + lat2) / 2.0;
    let dlat = (lat2 - lat1) * METERS_PER_DEGREE;
    let dlon = (lon2 - lon1) * METERS_PER_DEGREE * mean_lat.to_radians().cos();
    dlat.hypot(dlon)
}

/// Width and height of a bounding box in kilometers.
///
/// Returns `(width_km, height_km)`; the width uses the box's mid latitude.
pub fn area_size_km(bbox: &BoundingBox) -> (f64, f64) {
    let width_km = bbox.lon_span() * km_per_degree_lon(bbox.mid_lat());
    let height_km = bbox.lat_span() * KM_PER_DEGREE;
    (width_km, height_km)
}

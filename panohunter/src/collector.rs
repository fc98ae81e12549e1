//! Session-scoped panorama de-duplication
//!
//! Neighbouring grid points routinely snap to the same panorama, so the scan
//! keeps the first record per panorama id and rejects the rest.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::coord::GridPoint;
use crate::link::panorama_link_with_domain;
use crate::probe::PanoramaHit;

/// A discovered panorama, ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanoramaRecord {
    pub panorama_id: String,
    /// Server-corrected latitude
    pub exact_lat: f64,
    /// Server-corrected longitude
    pub exact_lng: f64,
    pub capture_date: Option<String>,
    pub attribution: Option<String>,
    /// Grid point whose query discovered the panorama
    #[serde(serialize_with = "serialize_point")]
    pub origin_point: GridPoint,
    pub distance_from_origin_m: f64,
    pub discovered_at: DateTime<Local>,
}

impl PanoramaRecord {
    /// Builds a record from a probe hit, stamping the discovery time.
    pub fn from_hit(hit: PanoramaHit, origin: GridPoint) -> Self {
        Self::from_hit_at(hit, origin, Local::now())
    }

    /// Builds a record with an explicit discovery time.
    pub fn from_hit_at(hit: PanoramaHit, origin: GridPoint, discovered_at: DateTime<Local>) -> Self {
        let distance_from_origin_m = origin.distance_to(hit.lat, hit.lng);
        Self {
            panorama_id: hit.panorama_id,
            exact_lat: hit.lat,
            exact_lng: hit.lng,
            capture_date: hit.capture_date,
            attribution: hit.attribution,
            origin_point: origin,
            distance_from_origin_m,
            discovered_at,
        }
    }

    /// Viewer link for this panorama on the given Maps domain.
    pub fn link(&self, domain: &str) -> String {
        panorama_link_with_domain(domain, &self.panorama_id, self.exact_lat, self.exact_lng)
    }
}

fn serialize_point<S: serde::Serializer>(point: &GridPoint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(point)
}

/// Result of offering a hit to the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    /// First sighting of this panorama id
    Accepted(PanoramaRecord),
    /// The id was already collected in this session
    Rejected { panorama_id: String },
}

/// Set of panorama ids seen during one scan session.
#[derive(Debug, Default)]
pub struct DeduplicatingCollector {
    seen: HashSet<String>,
    duplicates: usize,
}

impl DeduplicatingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a hit discovered from `origin`.
    pub fn accept(&mut self, hit: PanoramaHit, origin: GridPoint) -> Acceptance {
        if self.seen.contains(&hit.panorama_id) {
            self.duplicates += 1;
            return Acceptance::Rejected {
                panorama_id: hit.panorama_id,
            };
        }
        self.seen.insert(hit.panorama_id.clone());
        Acceptance::Accepted(PanoramaRecord::from_hit(hit, origin))
    }

    pub fn contains(&self, panorama_id: &str) -> bool {
        self.seen.contains(panorama_id)
    }

    /// Number of unique panoramas accepted.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Number of hits rejected as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

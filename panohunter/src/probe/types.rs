//! Probe outcome types and the probe trait

use thiserror::Error;

use super::http::HttpError;
use crate::coord::GridPoint;

/// A panorama reported by the metadata service.
///
/// Coordinates are the server-corrected location of the panorama, which can
/// sit anywhere within the search radius of the queried point.
#[derive(Debug, Clone, PartialEq)]
pub struct PanoramaHit {
    /// Opaque server-issued identifier
    pub panorama_id: String,
    /// Exact latitude of the panorama
    pub lat: f64,
    /// Exact longitude of the panorama
    pub lng: f64,
    /// Capture date as reported (typically `YYYY-MM`)
    pub capture_date: Option<String>,
    /// Copyright / attribution line
    pub attribution: Option<String>,
}

/// Classified result of one metadata query.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// A panorama exists within the radius
    Found(PanoramaHit),
    /// No panorama within the radius
    NotFound,
    /// The service signalled quota exhaustion; not retried
    RateLimited,
    /// The query failed; treated like `NotFound` by the scan loop
    TransportError(ProbeError),
}

impl ProbeOutcome {
    /// Short label used in logs and statistics.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Found(_) => "found",
            ProbeOutcome::NotFound => "not_found",
            ProbeOutcome::RateLimited => "rate_limited",
            ProbeOutcome::TransportError(_) => "transport_error",
        }
    }
}

/// Reasons a single probe failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// HTTP layer failure
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Request URL could not be built
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// Body was not the expected JSON document
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service answered with a status other than OK / ZERO_RESULTS / OVER_QUERY_LIMIT
    #[error("API status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    ApiStatus {
        status: String,
        message: Option<String>,
    },
}

/// One query against a panorama metadata capability.
///
/// Implementations issue exactly one request per call and never retry;
/// retry and pacing policy belong to the caller.
pub trait PanoramaProbe {
    /// Looks for the panorama nearest to `point` within `radius_m` meters.
    fn probe(&self, point: GridPoint, radius_m: u32) -> ProbeOutcome;
}

impl<P: PanoramaProbe + ?Sized> PanoramaProbe for &P {
    fn probe(&self, point: GridPoint, radius_m: u32) -> ProbeOutcome {
        (**self).probe(point, radius_m)
    }
}

impl<P: PanoramaProbe + ?Sized> PanoramaProbe for Box<P> {
    fn probe(&self, point: GridPoint, radius_m: u32) -> ProbeOutcome {
        (**self).probe(point, radius_m)
    }
}

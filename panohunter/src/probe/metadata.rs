//! Street View metadata probe.
//!
//! Queries the Street View Static API metadata endpoint, which is free of
//! charge but still counts against the project's request quota:
//!
//! `https://maps.googleapis.com/maps/api/streetview/metadata?location={LAT},{LON}&radius={R}&key={API_KEY}`
//!
//! The endpoint snaps the queried location to the nearest panorama within
//! the radius and reports its identifier and exact coordinates.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use tracing::{debug, trace};

use super::http::HttpClient;
use super::types::{PanoramaHit, PanoramaProbe, ProbeError, ProbeOutcome};
use crate::coord::GridPoint;

/// Production metadata endpoint.
pub const METADATA_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/streetview/metadata";

/// Metadata response document. Only the fields the scan uses are decoded.
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    status: String,
    pano_id: Option<String>,
    location: Option<LatLng>,
    date: Option<String>,
    copyright: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Panorama probe backed by the Street View metadata endpoint.
///
/// # Example
///
/// ```no_run
/// use panohunter::coord::GridPoint;
/// use panohunter::probe::{PanoramaProbe, ReqwestClient, StreetViewProbe};
///
/// let client = ReqwestClient::new().unwrap();
/// let probe = StreetViewProbe::new(client, "YOUR_API_KEY");
/// let outcome = probe.probe(GridPoint::new(61.668742, 50.835369), 50);
/// ```
pub struct StreetViewProbe<C: HttpClient> {
    http_client: C,
    api_key: String,
    endpoint: String,
    requests: AtomicU64,
}

impl<C: HttpClient> StreetViewProbe<C> {
    /// Creates a probe against the production endpoint.
    pub fn new(http_client: C, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            endpoint: METADATA_ENDPOINT.to_string(),
            requests: AtomicU64::new(0),
        }
    }

    /// Points the probe at a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Total requests issued by this probe over its lifetime.
    pub fn requests_issued(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn request_url(&self, point: GridPoint, radius_m: u32) -> Result<String, ProbeError> {
        let location = format!("{},{}", point.lat, point.lon);
        let radius = radius_m.to_string();
        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map(String::from)
        .map_err(|e| ProbeError::InvalidUrl(e.to_string()))
    }
}

impl<C: HttpClient> PanoramaProbe for StreetViewProbe<C> {
    fn probe(&self, point: GridPoint, radius_m: u32) -> ProbeOutcome {
        // Counted up front so failed requests still show in quota usage
        self.requests.fetch_add(1, Ordering::Relaxed);

        let url = match self.request_url(point, radius_m) {
            Ok(url) => url,
            Err(e) => return ProbeOutcome::TransportError(e),
        };

        trace!(lat = point.lat, lon = point.lon, radius_m, "Querying panorama metadata");

        let outcome = match self.http_client.get(&url) {
            Ok(body) => classify_response(&body),
            Err(e) if e.is_rate_limited() => ProbeOutcome::RateLimited,
            Err(e) => ProbeOutcome::TransportError(ProbeError::Http(e)),
        };

        debug!(
            lat = point.lat,
            lon = point.lon,
            outcome = outcome.label(),
            "Metadata probe complete"
        );
        outcome
    }
}

/// Classifies a raw metadata response body.
pub fn classify_response(body: &[u8]) -> ProbeOutcome {
    let response: MetadataResponse = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return ProbeOutcome::TransportError(ProbeError::InvalidResponse(e.to_string())),
    };

    match response.status.as_str() {
        "OK" => match (response.pano_id, response.location) {
            (Some(panorama_id), Some(location)) => ProbeOutcome::Found(PanoramaHit {
                panorama_id,
                lat: location.lat,
                lng: location.lng,
                capture_date: response.date.filter(|d| !d.is_empty()),
                attribution: response.copyright.filter(|c| !c.is_empty()),
            }),
            _ => ProbeOutcome::TransportError(ProbeError::InvalidResponse(
                "status OK without pano_id or location".to_string(),
            )),
        },
        "ZERO_RESULTS" | "NOT_FOUND" => ProbeOutcome::NotFound,
        "OVER_QUERY_LIMIT" => ProbeOutcome::RateLimited,
        _ => ProbeOutcome::TransportError(ProbeError::ApiStatus {
            status: response.status,
            message: response.error_message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::http::tests::MockHttpClient;
    use crate::probe::http::HttpError;

    const OK_BODY: &str = r#"{
        "copyright": "© Google",
        "date": "2023-07",
        "location": { "lat": 61.668742, "lng": 50.835369 },
        "pano_id": "CAoSLEFGMVFpcE5fTVhFNmhJQWtTb0J2SXc",
        "status": "OK"
    }"#;

    fn point() -> GridPoint {
        GridPoint::new(61.66, 50.83)
    }

    #[test]
    fn test_ok_response_yields_corrected_location() {
        let probe = StreetViewProbe::new(MockHttpClient::json(OK_BODY), "test_key");

        match probe.probe(point(), 50) {
            ProbeOutcome::Found(hit) => {
                assert_eq!(hit.panorama_id, "CAoSLEFGMVFpcE5fTVhFNmhJQWtTb0J2SXc");
                assert_eq!(hit.lat, 61.668742);
                assert_eq!(hit.lng, 50.835369);
                assert_eq!(hit.capture_date.as_deref(), Some("2023-07"));
                assert_eq!(hit.attribution.as_deref(), Some("© Google"));
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_results() {
        let probe = StreetViewProbe::new(MockHttpClient::json(r#"{"status":"ZERO_RESULTS"}"#), "k");
        assert_eq!(probe.probe(point(), 50), ProbeOutcome::NotFound);
    }

    #[test]
    fn test_over_query_limit() {
        let probe = StreetViewProbe::new(
            MockHttpClient::json(r#"{"status":"OVER_QUERY_LIMIT","error_message":"quota"}"#),
            "k",
        );
        assert_eq!(probe.probe(point(), 50), ProbeOutcome::RateLimited);
    }

    #[test]
    fn test_http_429_is_rate_limited() {
        let mock = MockHttpClient::new(vec![Err(HttpError::Status {
            status: 429,
            url: "/maps/api/streetview/metadata".into(),
        })]);
        let probe = StreetViewProbe::new(mock, "k");
        assert_eq!(probe.probe(point(), 50), ProbeOutcome::RateLimited);
    }

    #[test]
    fn test_request_denied_is_transport_error() {
        let probe = StreetViewProbe::new(
            MockHttpClient::json(r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#),
            "bad",
        );

        match probe.probe(point(), 50) {
            ProbeOutcome::TransportError(ProbeError::ApiStatus { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.unwrap().contains("invalid"));
            }
            other => panic!("expected ApiStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_network_failure_is_transport_error() {
        let mock = MockHttpClient::new(vec![Err(HttpError::Transport("timed out".into()))]);
        let probe = StreetViewProbe::new(mock, "k");
        assert!(matches!(
            probe.probe(point(), 50),
            ProbeOutcome::TransportError(ProbeError::Http(_))
        ));
    }

    #[test]
    fn test_malformed_body_is_transport_error() {
        let probe = StreetViewProbe::new(MockHttpClient::json("<html>oops</html>"), "k");
        assert!(matches!(
            probe.probe(point(), 50),
            ProbeOutcome::TransportError(ProbeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_ok_without_pano_id_is_invalid() {
        let outcome = classify_response(br#"{"status":"OK"}"#);
        assert!(matches!(
            outcome,
            ProbeOutcome::TransportError(ProbeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_empty_date_becomes_none() {
        let outcome = classify_response(
            br#"{"status":"OK","pano_id":"X","location":{"lat":1.0,"lng":2.0},"date":"","copyright":""}"#,
        );
        match outcome {
            ProbeOutcome::Found(hit) => {
                assert!(hit.capture_date.is_none());
                assert!(hit.attribution.is_none());
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_request_counter_counts_every_outcome() {
        let mock = MockHttpClient::new(vec![
            Ok(OK_BODY.as_bytes().to_vec()),
            Err(HttpError::Transport("reset".into())),
            Ok(br#"{"status":"ZERO_RESULTS"}"#.to_vec()),
        ]);
        let probe = StreetViewProbe::new(mock, "k");

        for _ in 0..3 {
            probe.probe(point(), 50);
        }
        assert_eq!(probe.requests_issued(), 3);
    }

    #[test]
    fn test_request_url_carries_query_parameters() {
        let probe = StreetViewProbe::new(MockHttpClient::json(OK_BODY), "my_key");
        probe.probe(GridPoint::new(61.66, 50.83), 75);

        let requests = probe.http_client.requests.lock().unwrap();
        let url = reqwest::Url::parse(&requests[0]).unwrap();
        assert_eq!(url.path(), "/maps/api/streetview/metadata");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("location".into(), "61.66,50.83".into())));
        assert!(params.contains(&("radius".into(), "75".into())));
        assert!(params.contains(&("key".into(), "my_key".into())));
    }

    #[test]
    fn test_custom_endpoint() {
        let probe = StreetViewProbe::new(MockHttpClient::json(OK_BODY), "k")
            .with_endpoint("http://localhost:9000/metadata");
        probe.probe(point(), 50);

        let requests = probe.http_client.requests.lock().unwrap();
        assert!(requests[0].starts_with("http://localhost:9000/metadata?"));
    }

    #[test]
    fn test_invalid_endpoint_is_transport_error() {
        let probe = StreetViewProbe::new(MockHttpClient::json(OK_BODY), "k").with_endpoint("not a url");
        assert!(matches!(
            probe.probe(point(), 50),
            ProbeOutcome::TransportError(ProbeError::InvalidUrl(_))
        ));
    }
}

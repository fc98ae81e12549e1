//! API key verification against well-known panorama locations.
//!
//! A key is only reported as working when the service actually answers for
//! it. When none of the reference locations gives a usable answer the result
//! is [`KeyCheck::Unconfirmed`], and callers decide explicitly whether to
//! proceed with an unverified key.

use tracing::{info, warn};

use super::types::{PanoramaProbe, ProbeError, ProbeOutcome};
use crate::coord::GridPoint;

/// Search radius used for the reference queries.
pub const KEY_CHECK_RADIUS_M: u32 = 100;

/// Locations with dense Street View coverage, tried in order.
pub const KEY_CHECK_LOCATIONS: [(&str, f64, f64); 3] = [
    ("Moscow (Red Square)", 55.7558, 37.6173),
    ("New York", 40.7128, -74.0060),
    ("Paris", 48.8566, 2.3522),
];

/// API statuses that refuse the key outright. Anything else (e.g.
/// `UNKNOWN_ERROR`) moves on to the next reference location.
const REJECTING_STATUSES: [&str; 2] = ["REQUEST_DENIED", "INVALID_REQUEST"];

/// Result of an API key verification.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCheck {
    /// A reference location returned a panorama
    Confirmed { location: &'static str },
    /// The service answered ZERO_RESULTS, so the key is accepted but no
    /// panorama confirmed it
    Reachable,
    /// The service refused the key (REQUEST_DENIED and similar)
    Rejected {
        status: String,
        message: Option<String>,
    },
    /// No reference location produced an answer (network errors, quota)
    Unconfirmed,
}

impl KeyCheck {
    /// Whether a scan may proceed with this key.
    ///
    /// `Unconfirmed` keys are only usable when the caller opts in.
    pub fn is_usable(&self, allow_unverified: bool) -> bool {
        match self {
            KeyCheck::Confirmed { .. } | KeyCheck::Reachable => true,
            KeyCheck::Rejected { .. } => false,
            KeyCheck::Unconfirmed => allow_unverified,
        }
    }
}

/// Verifies an API key by probing [`KEY_CHECK_LOCATIONS`].
///
/// Stops at the first confirmation or the first explicit rejection.
pub fn verify_api_key<P: PanoramaProbe>(probe: &P) -> KeyCheck {
    let mut reachable = false;

    for (name, lat, lon) in KEY_CHECK_LOCATIONS {
        match probe.probe(GridPoint::new(lat, lon), KEY_CHECK_RADIUS_M) {
            ProbeOutcome::Found(_) => {
                info!(location = name, "API key confirmed");
                return KeyCheck::Confirmed { location: name };
            }
            ProbeOutcome::NotFound => {
                info!(location = name, "No panorama at reference location, API answered");
                reachable = true;
            }
            ProbeOutcome::RateLimited => {
                warn!(location = name, "Rate limited while verifying API key");
            }
            ProbeOutcome::TransportError(ProbeError::ApiStatus { status, message })
                if REJECTING_STATUSES.contains(&status.as_str()) =>
            {
                warn!(location = name, %status, "API key rejected");
                return KeyCheck::Rejected { status, message };
            }
            ProbeOutcome::TransportError(e) => {
                warn!(location = name, error = %e, "Reference probe failed");
            }
        }
    }

    if reachable {
        KeyCheck::Reachable
    } else {
        KeyCheck::Unconfirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::http::HttpError;
    use crate::probe::PanoramaHit;
    use std::cell::RefCell;

    /// Probe returning scripted outcomes and recording queried points.
    struct ScriptedProbe {
        outcomes: RefCell<Vec<ProbeOutcome>>,
        queried: RefCell<Vec<GridPoint>>,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<ProbeOutcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes),
                queried: RefCell::new(Vec::new()),
            }
        }
    }

    impl PanoramaProbe for ScriptedProbe {
        fn probe(&self, point: GridPoint, radius_m: u32) -> ProbeOutcome {
            assert_eq!(radius_m, KEY_CHECK_RADIUS_M);
            self.queried.borrow_mut().push(point);
            self.outcomes.borrow_mut().remove(0)
        }
    }

    fn found() -> ProbeOutcome {
        ProbeOutcome::Found(PanoramaHit {
            panorama_id: "ref".into(),
            lat: 55.7558,
            lng: 37.6173,
            capture_date: None,
            attribution: None,
        })
    }

    fn network_error() -> ProbeOutcome {
        ProbeOutcome::TransportError(ProbeError::Http(HttpError::Transport("down".into())))
    }

    fn api_status(status: &str) -> ProbeOutcome {
        ProbeOutcome::TransportError(ProbeError::ApiStatus {
            status: status.to_string(),
            message: None,
        })
    }

    #[test]
    fn test_transient_status_tries_next_location() {
        let probe = ScriptedProbe::new(vec![api_status("UNKNOWN_ERROR"), found()]);
        assert_eq!(
            verify_api_key(&probe),
            KeyCheck::Confirmed {
                location: "New York"
            }
        );
        assert_eq!(probe.queried.borrow().len(), 2);
    }

    #[test]
    fn test_only_transient_statuses_leave_key_unconfirmed() {
        let probe = ScriptedProbe::new(vec![
            api_status("UNKNOWN_ERROR"),
            api_status("UNKNOWN_ERROR"),
            api_status("UNKNOWN_ERROR"),
        ]);
        assert_eq!(verify_api_key(&probe), KeyCheck::Unconfirmed);
    }

    #[test]
    fn test_invalid_request_rejects() {
        let probe = ScriptedProbe::new(vec![api_status("INVALID_REQUEST")]);
        assert!(matches!(verify_api_key(&probe), KeyCheck::Rejected { status, .. } if status == "INVALID_REQUEST"));
        assert_eq!(probe.queried.borrow().len(), 1);
    }

    #[test]
    fn test_first_location_confirms() {
        let probe = ScriptedProbe::new(vec![found()]);
        assert_eq!(
            verify_api_key(&probe),
            KeyCheck::Confirmed {
                location: "Moscow (Red Square)"
            }
        );
        assert_eq!(probe.queried.borrow().len(), 1);
    }

    #[test]
    fn test_later_location_confirms() {
        let probe = ScriptedProbe::new(vec![network_error(), ProbeOutcome::NotFound, found()]);
        assert_eq!(verify_api_key(&probe), KeyCheck::Confirmed { location: "Paris" });
    }

    #[test]
    fn test_zero_results_only_is_reachable() {
        let probe = ScriptedProbe::new(vec![
            ProbeOutcome::NotFound,
            ProbeOutcome::NotFound,
            ProbeOutcome::NotFound,
        ]);
        let check = verify_api_key(&probe);
        assert_eq!(check, KeyCheck::Reachable);
        assert!(check.is_usable(false));
    }

    #[test]
    fn test_request_denied_stops_early() {
        let probe = ScriptedProbe::new(vec![ProbeOutcome::TransportError(ProbeError::ApiStatus {
            status: "REQUEST_DENIED".into(),
            message: None,
        })]);
        let check = verify_api_key(&probe);
        assert!(matches!(check, KeyCheck::Rejected { .. }));
        assert!(!check.is_usable(true));
        assert_eq!(probe.queried.borrow().len(), 1);
    }

    #[test]
    fn test_nothing_confirms_requires_opt_in() {
        let probe = ScriptedProbe::new(vec![network_error(), ProbeOutcome::RateLimited, network_error()]);
        let check = verify_api_key(&probe);
        assert_eq!(check, KeyCheck::Unconfirmed);
        assert!(!check.is_usable(false));
        assert!(check.is_usable(true));
    }
}

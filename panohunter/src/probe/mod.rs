//! Panorama metadata probing
//!
//! A probe issues one metadata query for a point and classifies the answer
//! into a [`ProbeOutcome`]. The scan loop handles every variant explicitly:
//! found panoramas go to the collector, everything else is counted and the
//! scan moves on.
//!
//! ```ignore
//! use panohunter::probe::{ReqwestClient, StreetViewProbe};
//!
//! let client = ReqwestClient::new()?;
//! let probe = StreetViewProbe::new(client, api_key);
//! ```

mod http;
mod key_check;
mod metadata;
mod types;

pub use http::{HttpClient, HttpError, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use key_check::{verify_api_key, KeyCheck, KEY_CHECK_LOCATIONS, KEY_CHECK_RADIUS_M};
pub use metadata::{classify_response, StreetViewProbe, METADATA_ENDPOINT};
pub use types::{PanoramaHit, PanoramaProbe, ProbeError, ProbeOutcome};

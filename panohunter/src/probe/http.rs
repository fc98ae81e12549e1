//! HTTP client abstraction for testability

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Per-request timeout; a hung request must not stall the scan loop.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("panohunter/", env!("CARGO_PKG_VERSION"));

/// Errors produced by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    /// Server answered with a non-success status code
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Connection, DNS, TLS or timeout failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Response body could not be read
    #[error("Failed to read response: {0}")]
    Body(String),

    /// Client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Setup(String),
}

impl HttpError {
    /// Returns `true` for HTTP 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HttpError::Status { status: 429, .. })
    }
}

/// Trait for blocking HTTP GET requests.
///
/// Scans are strictly sequential, so a blocking client is all the probe
/// needs. The trait exists so tests can substitute canned responses.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| HttpError::Setup(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        trace!("HTTP GET request starting");

        let response = match self.client.get(url).send() {
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), "HTTP response received");
                resp
            }
            Err(e) => {
                // The URL carries the API key, so only the error kinds are logged
                warn!(
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    is_request = e.is_request(),
                    "HTTP request failed"
                );
                return Err(HttpError::Transport(e.without_url().to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: response.url().path().to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Body(e.without_url().to_string()))
    }
}

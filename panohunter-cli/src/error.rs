//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use panohunter::config::{ConfigFileError, ProfileError};
use panohunter::probe::HttpError;
use panohunter::scan::ScanError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// No API key on the command line or in config.ini
    MissingApiKey,
    /// Scan area could not be determined from the arguments
    Area(String),
    /// Profile or city preset could not be loaded
    Profile(ProfileError),
    /// HTTP client could not be created
    Http(HttpError),
    /// The metadata service refused the API key
    KeyRejected {
        status: String,
        message: Option<String>,
    },
    /// No reference location confirmed the API key
    KeyUnconfirmed,
    /// Scan failed to start or to write its results
    Scan(ScanError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::MissingApiKey => {
                eprintln!();
                eprintln!("Provide a key with --api-key or store it once with:");
                eprintln!("  panohunter config set api.key <YOUR_KEY>");
            }
            CliError::KeyRejected { .. } | CliError::KeyUnconfirmed => {
                eprintln!();
                eprintln!("Make sure:");
                eprintln!("  1. Street View Static API is enabled in Google Cloud Console");
                eprintln!("  2. Your API key is valid and not restricted to other APIs");
                eprintln!("  3. The daily request quota is not exhausted");
                if matches!(self, CliError::KeyUnconfirmed) {
                    eprintln!();
                    eprintln!("Pass --allow-unverified-key to scan anyway.");
                }
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::MissingApiKey => write!(f, "No API key configured"),
            CliError::Area(msg) => write!(f, "Invalid scan area: {}", msg),
            CliError::Profile(e) => write!(f, "{}", e),
            CliError::Http(e) => write!(f, "{}", e),
            CliError::KeyRejected { status, message } => match message {
                Some(m) => write!(f, "API key rejected ({}): {}", status, m),
                None => write!(f, "API key rejected ({})", status),
            },
            CliError::KeyUnconfirmed => write!(f, "API key could not be verified"),
            CliError::Scan(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Profile(e) => Some(e),
            CliError::Http(e) => Some(e),
            CliError::Scan(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ProfileError> for CliError {
    fn from(e: ProfileError) -> Self {
        CliError::Profile(e)
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Http(e)
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        CliError::Scan(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rejected_message() {
        let err = CliError::KeyRejected {
            status: "REQUEST_DENIED".to_string(),
            message: Some("The provided API key is invalid.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API key rejected (REQUEST_DENIED): The provided API key is invalid."
        );
    }

    #[test]
    fn test_scan_error_source() {
        use std::error::Error;

        let err = CliError::from(ScanError::InvalidConfig {
            field: "max_points",
            reason: "must be greater than 0".to_string(),
        });
        assert!(err.source().is_some());
        assert!(err.to_string().contains("max_points"));
    }
}

//! Check-key command - verify an API key against reference locations.

use panohunter::probe::{
    verify_api_key, KeyCheck, PanoramaProbe, ReqwestClient, StreetViewProbe, KEY_CHECK_LOCATIONS,
};

use super::common::{mask_key, resolve_api_key};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the check-key command.
#[derive(Default)]
pub struct KeyArgs {
    pub api_key: Option<String>,
    pub debug: bool,
}

/// Run the check-key command.
///
/// Fails unless the key is confirmed or at least accepted by the service.
pub fn run(args: KeyArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("check-key");

    let api_key = resolve_api_key(args.api_key, runner.config())?;
    println!("Checking API key {}...", mask_key(&api_key));

    let probe = StreetViewProbe::new(ReqwestClient::new()?, api_key);
    let check = check_key(&probe);

    match check {
        KeyCheck::Unconfirmed => Err(CliError::KeyUnconfirmed),
        KeyCheck::Rejected { status, message } => Err(CliError::KeyRejected { status, message }),
        KeyCheck::Confirmed { .. } | KeyCheck::Reachable => Ok(()),
    }
}

/// Verifies the key and prints the outcome.
///
/// Shared with `scan --verify-key`.
pub fn check_key<P: PanoramaProbe>(probe: &P) -> KeyCheck {
    let check = verify_api_key(probe);

    match &check {
        KeyCheck::Confirmed { location } => {
            println!("✓ API key works (panorama found near {})", location);
        }
        KeyCheck::Reachable => {
            println!("✓ API key accepted (no panorama at the reference locations)");
        }
        KeyCheck::Rejected { status, .. } => {
            println!("✗ API key rejected: {}", status);
        }
        KeyCheck::Unconfirmed => {
            let names: Vec<&str> = KEY_CHECK_LOCATIONS.iter().map(|(n, _, _)| *n).collect();
            println!("? Could not verify API key ({} did not answer)", names.join(", "));
        }
    }

    check
}

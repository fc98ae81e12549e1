//! Scan command - probe an area and write the discovered panoramas.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use panohunter::probe::{KeyCheck, ReqwestClient, StreetViewProbe};
use panohunter::report::FileResultWriter;
use panohunter::scan::{ScanEngine, ScanProgress, ScanProgressCallback, ScanStatistics};

use super::common::{
    format_duration_compact, print_area, resolve_api_key, resolve_area, resolve_output_path,
    AreaArgs, SearchArgs,
};
use super::key::check_key;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the scan command.
#[derive(Default)]
pub struct ScanArgs {
    pub area: AreaArgs,
    pub search: SearchArgs,
    pub api_key: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub verify_key: bool,
    pub allow_unverified_key: bool,
    pub debug: bool,
}

/// Run the scan command.
pub fn run(args: ScanArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("scan");
    let config = runner.config();

    let api_key = resolve_api_key(args.api_key, config)?;
    let area = resolve_area(&args.area, &args.search, config)?;
    let scan_config = area.scan_config();
    scan_config.validate()?;

    let output = resolve_output_path(args.output.as_deref(), &area, config);

    println!("PanoHunter v{}", panohunter::VERSION);
    println!();
    print_area(&area);
    println!("  Output:        {}", output.display());
    println!();

    let probe = StreetViewProbe::new(ReqwestClient::new()?, api_key);

    if args.verify_key {
        match check_key(&probe) {
            KeyCheck::Rejected { status, message } => {
                return Err(CliError::KeyRejected { status, message })
            }
            check if !check.is_usable(args.allow_unverified_key) => {
                return Err(CliError::KeyUnconfirmed)
            }
            _ => {}
        }
        println!();
    }

    let writer = FileResultWriter::new(&output)
        .with_link_domain(config.output.link_domain.clone())
        .with_json(args.json || config.output.json);

    // Set up signal handler for graceful interruption
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let progress: ScanProgressCallback = Arc::new(print_progress);
    let engine = ScanEngine::new(probe, writer)
        .with_cancel_flag(cancel)
        .with_progress(progress);

    println!("Scanning... (Ctrl+C stops and saves what was found)");
    let stats = engine.search_area(area.bounds, &scan_config)?;
    info!(found = stats.found_count, "Scan command finished");

    println!();
    print_summary(&stats, scan_config.max_points());
    Ok(())
}

fn print_progress(p: &ScanProgress) {
    let eta = p
        .eta()
        .map(format_duration_compact)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  [{:>5.1}%] {}/{} points, {} found, {:.1} pts/s, ETA {}",
        p.percent(),
        p.points_checked,
        p.points_total,
        p.found,
        p.points_per_sec(),
        eta
    );
}

fn print_summary(stats: &ScanStatistics, max_points: usize) {
    if stats.was_interrupted() {
        println!("Scan interrupted, results are partial.");
    } else {
        println!("Scan complete.");
    }
    println!("========================================");
    println!("Points checked:   {}", stats.points_checked);
    println!("Panoramas found:  {}", stats.found_count);
    println!("Efficiency:       {:.1}%", stats.efficiency_ratio * 100.0);
    println!("Requests:         {}", stats.request_count);
    println!(
        "Time:             {} ({:.1} pts/s)",
        format_duration_compact(Duration::from_secs_f64(stats.elapsed_seconds)),
        stats.points_per_sec()
    );
    if stats.duplicates > 0 {
        println!("Duplicates:       {}", stats.duplicates);
    }
    if stats.rate_limited > 0 {
        println!(
            "Rate limited:     {} ({:.1}%)",
            stats.rate_limited,
            stats.rate_limited_percent()
        );
    }
    if stats.transport_failures > 0 {
        println!("Failed requests:  {}", stats.transport_failures);
    }
    if let Some(note) = truncation_note(stats, max_points) {
        println!("{}", note);
    }

    if let Some(summary) = &stats.output {
        println!();
        println!("Average distance: {:.1} m", summary.avg_distance_m);
        println!("Capture dates:    {}", summary.unique_dates);
        println!("Files:");
        for file in &summary.files {
            println!("  {}", file.display());
        }
    }

    if stats.found_nothing() {
        println!();
        println!("No panoramas found. Possible causes:");
        println!("  1. The API key is invalid (try: panohunter check-key)");
        println!("  2. Street View Static API is not enabled for the key");
        println!("  3. There are no panoramas in this area");
        println!("  4. The daily request quota is exhausted");
    }
}

/// Note printed when `max_points` cut the grid short.
fn truncation_note(stats: &ScanStatistics, max_points: usize) -> Option<String> {
    stats.truncated.then(|| {
        format!(
            "Note: grid had {} points, scan was limited to the first {}",
            stats.total_grid_points, max_points
        )
    })
}

//! Estimate command - grid size and minimum duration without network access.

use std::time::Duration;

use panohunter::grid::{estimate_point_count, GeoGrid};

use super::common::{
    format_duration_compact, print_area, resolve_area, AreaArgs, ResolvedArea, SearchArgs,
};
use crate::error::CliError;

/// Arguments for the estimate command.
#[derive(Default)]
pub struct EstimateArgs {
    pub area: AreaArgs,
    pub search: SearchArgs,
}

/// Run the estimate command.
pub fn run(args: EstimateArgs) -> Result<(), CliError> {
    let config = panohunter::config::ConfigFile::load()?;
    let area = resolve_area(&args.area, &args.search, &config)?;

    let scan_config = area.scan_config();
    scan_config.validate()?;

    print_area(&area);
    println!();

    let counts = GridCounts::for_area(&area)?;
    let points = counts.scanned;

    println!("Estimated points: ~{}", counts.estimated);
    println!(
        "Grid points:      {} ({} rows × {} columns)",
        counts.exact, counts.rows, counts.columns
    );
    if counts.is_truncated() {
        println!(
            "  Limited to {} points; raise --max-points or --step-km to cover the whole area",
            points
        );
    }
    println!("Requests:         ~{}", points);

    let minimum = Duration::from_secs_f64(points.saturating_sub(1) as f64 * area.search.delay);
    println!(
        "Minimum time:     {} (pacing only, network time comes on top)",
        format_duration_compact(minimum)
    );

    Ok(())
}

/// Point counts for an area: the dimensional estimate and the exact walk.
#[derive(Debug, Clone, PartialEq)]
struct GridCounts {
    estimated: usize,
    exact: usize,
    rows: usize,
    columns: usize,
    /// Points a scan would probe after `max_points`
    scanned: usize,
}

impl GridCounts {
    fn for_area(area: &ResolvedArea) -> Result<Self, CliError> {
        let step_km = area.search.step_km;
        let estimated = estimate_point_count(&area.bounds, step_km)
            .map_err(|e| CliError::Area(e.to_string()))?;
        let grid =
            GeoGrid::new(area.bounds, step_km).map_err(|e| CliError::Area(e.to_string()))?;
        let exact = grid.point_count();

        Ok(Self {
            estimated,
            exact,
            rows: grid.rows(),
            columns: grid.columns(),
            scanned: exact.min(area.search.max_points),
        })
    }

    fn is_truncated(&self) -> bool {
        self.exact > self.scanned
    }
}

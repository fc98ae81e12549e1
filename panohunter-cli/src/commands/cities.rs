//! Cities command - list built-in area presets.

use panohunter::config::city_presets;
use panohunter::grid::estimate_point_count;

use crate::error::CliError;

/// Run the cities command.
pub fn run() -> Result<(), CliError> {
    let presets = city_presets()?;

    println!("Built-in city presets");
    println!("=====================");
    println!();

    for (id, profile) in presets {
        let b = &profile.bounds;
        let points = estimate_point_count(b, profile.search.step_km).unwrap_or(0);

        println!("{}  ({})", id, profile.name);
        if let Some(description) = &profile.description {
            println!("  {}", description);
        }
        println!(
            "  Bounds: {:.4}..{:.4} N, {:.4}..{:.4} E",
            b.lat_min(),
            b.lat_max(),
            b.lon_min(),
            b.lon_max()
        );
        println!(
            "  Step {} km, radius {} m, ~{} grid points (max {})",
            profile.search.step_km,
            profile.search.search_radius,
            points,
            profile.search.max_points
        );
        println!();
    }

    println!("Scan one with: panohunter scan --city <ID>");
    Ok(())
}

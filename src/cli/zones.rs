//! Zones command: intensity distribution across activities

use anyhow::Result;

use crate::analysis::{activity_zones, format_duration, Zone, ZoneConfig};
use crate::query::QueryLayer;
use crate::store::ActivityFilter;

pub fn run(queries: &QueryLayer, zones: &ZoneConfig, filter: &ActivityFilter) -> Result<()> {
    let activities = queries.list_activities(filter)?;
    if activities.is_empty() {
        println!("No activities found.");
        return Ok(());
    }

    let dist = activity_zones(&activities, zones);
    let pct = dist.percentages();

    println!(
        "Heart-rate zones across {} activities{}",
        activities.len(),
        filter
            .activity_type
            .as_deref()
            .map(|t| format!(" ({})", t))
            .unwrap_or_default()
    );
    println!();
    println!(
        "{:<4} {:<9} {:>11} {:>12} {:>7}",
        "Zone", "BPM", "Time", "Distance", "Share"
    );
    println!("{}", "-".repeat(48));
    for i in 0..5 {
        let zone = Zone(i as u8 + 1);
        println!(
            "{:<4} {:<9} {:>11} {:>9.1} km {:>6.1}%",
            zone.to_string(),
            zones.range_label(zone),
            format_duration(dist.seconds[i]),
            dist.meters[i] / 1000.0,
            pct[i]
        );
    }
    if dist.unzoned_seconds > 0.0 {
        println!(
            "{:<14} {:>11}",
            "No HR data",
            format_duration(dist.unzoned_seconds)
        );
    }
    Ok(())
}

//! List commands

use anyhow::Result;

use super::{short_date, truncate};
use crate::analysis::{format_duration, format_pace};
use crate::query::QueryLayer;
use crate::store::ActivityFilter;

pub fn run(queries: &QueryLayer, filter: &ActivityFilter) -> Result<()> {
    let activities = queries.list_activities(filter)?;

    if activities.is_empty() {
        println!("No activities found. Run 'trainlog import' first.");
        return Ok(());
    }

    println!(
        "{:<17} {:<12} {:<8} {:>9} {:>9} {:>11} {:>5} {}",
        "Date", "ID", "Type", "Distance", "Time", "Pace", "HR", "Name"
    );
    println!("{}", "-".repeat(100));

    for a in activities.iter() {
        let distance = a
            .distance_km
            .map(|km| format!("{:.2} km", km))
            .unwrap_or_else(|| "-".to_string());
        let time = a
            .moving_time
            .map(|s| format_duration(s as f64))
            .unwrap_or_else(|| "-".to_string());
        let hr = a
            .average_heart_rate
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = a
            .activity_name
            .as_deref()
            .map(|n| truncate(n, 35))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<17} {:<12} {:<8} {:>9} {:>9} {:>11} {:>5} {}",
            short_date(&a.activity_date),
            a.activity_id,
            a.activity_type.as_deref().unwrap_or("-"),
            distance,
            time,
            format_pace(a.pace_decimal),
            hr,
            name,
        );
    }

    Ok(())
}

/// Activities that have stream data
pub fn streams(queries: &QueryLayer) -> Result<()> {
    let activities = queries.activities_with_streams()?;

    if activities.is_empty() {
        println!("No stream data found. Run 'trainlog import-streams' first.");
        return Ok(());
    }

    println!(
        "{:<17} {:<12} {:<8} {:>9} {:<6} {:>8} {}",
        "Date", "ID", "Type", "Distance", "Format", "Samples", "Name"
    );
    println!("{}", "-".repeat(90));

    for a in activities.iter() {
        println!(
            "{:<17} {:<12} {:<8} {:>9} {:<6} {:>8} {}",
            short_date(&a.activity_date),
            a.activity_id,
            a.activity_type.as_deref().unwrap_or("-"),
            a.distance_km
                .map(|km| format!("{:.2} km", km))
                .unwrap_or_else(|| "-".to_string()),
            a.source_format,
            a.sample_count,
            a.activity_name
                .as_deref()
                .map(|n| truncate(n, 35))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    println!("\n{} activities with streams", activities.len());
    Ok(())
}

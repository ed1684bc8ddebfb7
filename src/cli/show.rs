//! Show command: one activity's stream, zones, splits and best efforts

use anyhow::{bail, Result};

use super::short_date;
use crate::analysis::{
    best_efforts, format_duration, format_pace, kilometer_splits, smoothed_pace, stream_zones, Zone,
    ZoneConfig,
};
use crate::query::QueryLayer;
use crate::store::{ActivityFilter, StreamRow};

pub fn run(queries: &QueryLayer, zones: &ZoneConfig, activity_id: i64) -> Result<()> {
    let activities = queries.list_activities(&ActivityFilter::default())?;
    let Some(activity) = activities.iter().find(|a| a.activity_id == activity_id) else {
        bail!("Activity not found: {}", activity_id);
    };

    println!(
        "🏃 {} ({})",
        activity.activity_name.as_deref().unwrap_or("Untitled"),
        activity.activity_type.as_deref().unwrap_or("-")
    );
    println!("   ID:   {}", activity.activity_id);
    println!("   Date: {}", short_date(&activity.activity_date));
    if let Some(gear) = &activity.gear {
        println!("   Gear: {}", gear);
    }
    println!();

    let stream = queries.activity_stream(activity_id)?;
    if stream.is_empty() {
        println!("No stream data for this activity.");
        return Ok(());
    }

    print_overview(&stream);
    print_zones(&stream, zones);
    print_splits(&stream);
    print_best_efforts(&stream);
    Ok(())
}

fn print_overview(stream: &[StreamRow]) {
    let duration = stream.last().map(|s| s.elapsed_seconds).unwrap_or(0.0);
    let distance_km = stream.iter().filter_map(|s| s.distance).fold(0.0, f64::max) / 1000.0;
    let hr: Vec<i64> = stream.iter().filter_map(|s| s.heart_rate).collect();
    let altitude: Vec<f64> = stream.iter().filter_map(|s| s.altitude).collect();

    println!("📈 Stream Overview");
    println!("{}", "-".repeat(40));
    println!("Samples:   {} ({})", stream.len(), stream[0].source_type);
    println!("Duration:  {}", format_duration(duration));
    println!("Distance:  {:.2} km", distance_km);
    if distance_km > 0.0 {
        println!(
            "Avg pace:  {}",
            format_pace(Some(duration / 60.0 / distance_km))
        );
    }
    let paces: Vec<f64> = smoothed_pace(stream)
        .into_iter()
        .flatten()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if !paces.is_empty() {
        let fastest = paces.iter().copied().fold(f64::INFINITY, f64::min);
        let slowest = paces.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let estimated = if stream.iter().all(|s| s.speed.is_none()) {
            " (from distance)"
        } else {
            ""
        };
        println!(
            "Pace range: {} to {}{}",
            format_pace(Some(fastest)),
            format_pace(Some(slowest)),
            estimated
        );
    }
    if !hr.is_empty() {
        let avg = hr.iter().sum::<i64>() as f64 / hr.len() as f64;
        let max = hr.iter().max().copied().unwrap_or(0);
        println!("Heart rate: avg {:.0}, max {}", avg, max);
    }
    if !altitude.is_empty() {
        let low = altitude.iter().copied().fold(f64::INFINITY, f64::min);
        let high = altitude.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!("Altitude:  {:.0}-{:.0} m", low, high);
    }
    println!();
}

fn print_zones(stream: &[StreamRow], zones: &ZoneConfig) {
    let dist = stream_zones(stream, zones);
    if dist.total_seconds() <= 0.0 {
        return;
    }

    println!("❤️  Time in Zones");
    println!("{}", "-".repeat(40));
    let pct = dist.percentages();
    for i in 0..5 {
        let zone = Zone(i as u8 + 1);
        println!(
            "{:<4} {:<9} {:>9} {:>8.2} km {:>5.1}%",
            zone.to_string(),
            zones.range_label(zone),
            format_duration(dist.seconds[i]),
            dist.meters[i] / 1000.0,
            pct[i]
        );
    }
    if dist.unzoned_seconds > 0.0 {
        println!("No HR    {:>9}", format_duration(dist.unzoned_seconds));
    }
    println!();
}

fn print_splits(stream: &[StreamRow]) {
    let splits = kilometer_splits(stream);
    if splits.is_empty() {
        return;
    }

    println!("⏱  Splits");
    println!("{}", "-".repeat(40));
    println!("{:>3} {:>8} {:>11} {:>5} {:>5}", "km", "Time", "Pace", "HR", "Cad");
    for split in &splits {
        println!(
            "{:>3} {:>8} {:>11} {:>5} {:>5}",
            split.km,
            format_duration(split.seconds),
            format_pace(split.pace),
            split
                .average_heart_rate
                .map(|v| format!("{:.0}", v))
                .unwrap_or_else(|| "-".to_string()),
            split
                .average_cadence
                .map(|v| format!("{:.0}", v))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!();
}

fn print_best_efforts(stream: &[StreamRow]) {
    let efforts = best_efforts(stream);
    if efforts.is_empty() {
        return;
    }

    println!("🏅 Best Efforts");
    println!("{}", "-".repeat(40));
    for effort in &efforts {
        println!(
            "{:<14} {:>9} {:>11}  (from {})",
            effort.name,
            format_duration(effort.seconds),
            format_pace(Some(effort.pace)),
            format_duration(effort.start_elapsed)
        );
    }
}

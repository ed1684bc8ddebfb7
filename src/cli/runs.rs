//! Runs command: pace and heart-rate summary over training runs

use anyhow::Result;

use crate::analysis::{format_pace, run_summary};
use crate::query::QueryLayer;
use crate::store::ActivityFilter;

pub fn run(queries: &QueryLayer, filter: &ActivityFilter) -> Result<()> {
    let activities = queries.list_activities(filter)?;
    let Some(summary) = run_summary(&activities) else {
        println!("No runs found.");
        return Ok(());
    };

    let bpm = |v: Option<f64>| {
        v.map(|v| format!("{:.0} bpm", v))
            .unwrap_or_else(|| "N/A".to_string())
    };

    println!("🏃 Run Summary (commutes excluded)");
    println!("{}", "-".repeat(40));
    println!("Runs:          {}", summary.runs);
    println!("Distance:      {:.1} km", summary.total_distance_km);
    println!("Average pace:  {}", format_pace(summary.average_pace));
    println!("Median pace:   {}", format_pace(summary.median_pace));
    println!("Fastest pace:  {}", format_pace(summary.fastest_pace));
    println!("Average HR:    {}", bpm(summary.average_heart_rate));
    println!("Median HR:     {}", bpm(summary.median_heart_rate));
    println!(
        "Max HR:        {}",
        summary
            .max_heart_rate
            .map(|v| format!("{} bpm", v))
            .unwrap_or_else(|| "N/A".to_string())
    );
    Ok(())
}

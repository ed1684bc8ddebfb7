//! Weekly command: distance and moving time per week and activity type

use anyhow::Result;

use crate::analysis::{format_duration, weekly_totals};
use crate::query::QueryLayer;
use crate::store::ActivityFilter;

pub fn run(queries: &QueryLayer, filter: &ActivityFilter) -> Result<()> {
    let activities = queries.list_activities(filter)?;
    let weeks = weekly_totals(&activities);

    if weeks.is_empty() {
        println!("No activities found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:>6} {:>11} {:>10}",
        "Week of", "Type", "Count", "Distance", "Moving"
    );
    println!("{}", "-".repeat(55));

    let mut current = None;
    for week in &weeks {
        let label = if current == Some(week.week_start) {
            String::new()
        } else {
            week.week_start.format("%Y-%m-%d").to_string()
        };
        current = Some(week.week_start);
        println!(
            "{:<12} {:<12} {:>6} {:>8.1} km {:>10}",
            label,
            week.activity_type,
            week.activities,
            week.distance_km,
            format_duration(week.moving_seconds as f64),
        );
    }
    Ok(())
}

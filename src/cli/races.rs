//! Races command: top performances per race distance

use anyhow::Result;

use super::{short_date, truncate};
use crate::analysis::{format_duration, format_pace, race_results};
use crate::config::Config;
use crate::query::QueryLayer;
use crate::store::ActivityFilter;

pub fn run(queries: &QueryLayer, config: &Config) -> Result<()> {
    let activities = queries.list_activities(&ActivityFilter::of_type("Run"))?;
    let results = race_results(&activities, &config.races, &config.zones);

    if results.is_empty() {
        println!("No runs match the configured race distances.");
        return Ok(());
    }

    let mut current: Option<&str> = None;
    for r in &results {
        if current != Some(r.category.as_str()) {
            if current.is_some() {
                println!();
            }
            println!("🏁 {}", r.category);
            println!("{}", "-".repeat(80));
            current = Some(r.category.as_str());
        }
        println!(
            "{}. {:<17} {:>7.2} km {:>9} {:>11} {:>4} {:<3} {}",
            r.rank,
            short_date(&r.activity_date),
            r.distance_km,
            format_duration(r.seconds as f64),
            format_pace(Some(r.pace_decimal)),
            r.average_heart_rate
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.zone.map(|z| z.to_string()).unwrap_or_default(),
            r.activity_name
                .as_deref()
                .map(|n| truncate(n, 30))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

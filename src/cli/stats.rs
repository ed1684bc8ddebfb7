//! Stats command

use anyhow::Result;

use super::short_date;
use crate::analysis::format_duration;
use crate::query::QueryLayer;

pub fn run(queries: &QueryLayer) -> Result<()> {
    let stats = queries.stats()?;

    println!("📊 Database Statistics");
    println!("{}", "-".repeat(40));
    println!("Activities:              {}", stats.total_activities);
    println!("Activities with streams: {}", stats.activities_with_streams);
    println!("Stream records:          {}", stats.total_stream_records);
    if let (Some(first), Some(last)) = (&stats.first_activity, &stats.last_activity) {
        println!(
            "Date range:              {} → {}",
            short_date(first),
            short_date(last)
        );
    }
    println!(
        "Database size:           {:.1} MB",
        stats.database_size_bytes as f64 / (1024.0 * 1024.0)
    );

    if !stats.activity_types.is_empty() {
        println!();
        println!(
            "{:<16} {:>6} {:>12} {:>12}",
            "Type", "Count", "Distance", "Moving"
        );
        println!("{}", "-".repeat(50));
        for t in &stats.activity_types {
            println!(
                "{:<16} {:>6} {:>9.1} km {:>12}",
                t.activity_type,
                t.activity_count,
                t.total_distance_km.unwrap_or(0.0),
                format_duration(t.total_moving_time.unwrap_or(0) as f64),
            );
        }
    }
    Ok(())
}

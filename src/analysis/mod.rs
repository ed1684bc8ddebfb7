//! Derived views over query results: zones, best efforts, races, splits,
//! weekly volume and run summaries

mod efforts;
mod pace;
mod runs;
mod splits;
mod weekly;
mod zones;

pub use efforts::{best_efforts, race_results, BestEffort, RaceResult, STANDARD_DISTANCES};
pub use pace::smoothed_pace;
pub use runs::{is_training_run, run_summary, RunSummary};
pub use splits::{kilometer_splits, Split};
pub use weekly::{week_start, weekly_totals, WeekTotal};
pub use zones::{activity_zones, stream_zones, Zone, ZoneConfig, ZoneDistribution};

/// `h:mm:ss`, or `m:ss` under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Decimal minutes per km as `m:ss /km`
pub fn format_pace(pace: Option<f64>) -> String {
    match pace {
        Some(p) if p.is_finite() && p > 0.0 => {
            let total = (p * 60.0).round() as i64;
            format!("{}:{:02} /km", total / 60, total % 60)
        }
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.0), "0:59");
        assert_eq!(format_duration(1500.0), "25:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(Some(5.5)), "5:30 /km");
        assert_eq!(format_pace(Some(1000.0 / (2.5 * 60.0))), "6:40 /km");
        assert_eq!(format_pace(None), "N/A");
    }
}

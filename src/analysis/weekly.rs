//! Weekly training volume per activity type

use chrono::{DateTime, Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::store::ActivityRow;

/// Totals for one (week, activity type); weeks start on Monday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTotal {
    pub week_start: NaiveDate,
    pub activity_type: String,
    pub activities: usize,
    pub distance_km: f64,
    pub moving_seconds: i64,
}

/// Monday of the week containing `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Oldest week first, types alphabetical within a week
pub fn weekly_totals(activities: &[ActivityRow]) -> Vec<WeekTotal> {
    let mut weeks: BTreeMap<(NaiveDate, String), WeekTotal> = BTreeMap::new();

    for a in activities {
        let Ok(date) = DateTime::parse_from_rfc3339(&a.activity_date) else {
            tracing::debug!(activity_id = a.activity_id, "Unparseable activity date");
            continue;
        };
        let week = week_start(date.date_naive());
        let activity_type = a.activity_type.clone().unwrap_or_else(|| "Other".to_string());

        let total = weeks
            .entry((week, activity_type.clone()))
            .or_insert_with(|| WeekTotal {
                week_start: week,
                activity_type,
                activities: 0,
                distance_km: 0.0,
                moving_seconds: 0,
            });
        total.activities += 1;
        total.distance_km += a.distance_km.unwrap_or(0.0);
        total.moving_seconds += a.moving_time.unwrap_or(0);
    }

    weeks.into_values().collect()
}

//! Best efforts and race performances

use serde::Serialize;

use super::zones::{Zone, ZoneConfig};
use crate::config::RaceConfig;
use crate::store::{ActivityRow, StreamRow};

/// Standard distances searched for in a stream, in meters
pub const STANDARD_DISTANCES: &[(&str, f64)] = &[
    ("1k", 1000.0),
    ("5k", 5000.0),
    ("10k", 10_000.0),
    ("Half Marathon", 21_097.5),
    ("Marathon", 42_195.0),
];

/// Fastest stretch of a stream covering a standard distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestEffort {
    pub name: String,
    pub distance_m: f64,
    pub seconds: f64,
    /// Minutes per kilometer over the standard distance
    pub pace: f64,
    /// Elapsed seconds at which the effort starts
    pub start_elapsed: f64,
}

/// Minimum elapsed time over every standard distance the stream covers
pub fn best_efforts(stream: &[StreamRow]) -> Vec<BestEffort> {
    let points: Vec<(f64, f64)> = stream
        .iter()
        .filter_map(|s| s.distance.map(|d| (s.elapsed_seconds, d)))
        .collect();

    STANDARD_DISTANCES
        .iter()
        .filter_map(|(name, target)| {
            fastest_window(&points, *target).map(|(seconds, start_elapsed)| BestEffort {
                name: name.to_string(),
                distance_m: *target,
                seconds,
                pace: (seconds / 60.0) / (target / 1000.0),
                start_elapsed,
            })
        })
        .collect()
}

/// Shortest (duration, start) whose distance gain reaches `target`
fn fastest_window(points: &[(f64, f64)], target: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    let mut i = 0;
    for j in 0..points.len() {
        // tighten the window start while it still covers the target
        while i + 1 < j && points[j].1 - points[i + 1].1 >= target {
            i += 1;
        }
        if i < j && points[j].1 - points[i].1 >= target {
            let duration = points[j].0 - points[i].0;
            if duration > 0.0 && best.map_or(true, |(b, _)| duration < b) {
                best = Some((duration, points[i].0));
            }
        }
    }
    best
}

/// One ranked activity inside a race distance window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    pub category: String,
    pub rank: usize,
    pub activity_id: i64,
    pub activity_name: Option<String>,
    pub activity_date: String,
    pub distance_km: f64,
    pub seconds: i64,
    pub pace_decimal: f64,
    pub average_heart_rate: Option<i64>,
    pub max_heart_rate: Option<i64>,
    pub zone: Option<Zone>,
}

/// Fastest runs per configured race window, ranked by elapsed time
pub fn race_results(
    activities: &[ActivityRow],
    races: &RaceConfig,
    zones: &ZoneConfig,
) -> Vec<RaceResult> {
    let runs: Vec<(&ActivityRow, f64, i64)> = activities
        .iter()
        .filter(|a| a.activity_type.as_deref() == Some("Run"))
        .filter_map(|a| {
            let km = a.distance_km?;
            let seconds = a.elapsed_time.or(a.moving_time)?;
            Some((a, km, seconds))
        })
        .collect();

    let mut results = Vec::new();
    for cat in &races.categories {
        let mut matches: Vec<&(&ActivityRow, f64, i64)> = runs
            .iter()
            .filter(|(_, km, _)| *km >= cat.min_km && *km <= cat.max_km)
            .collect();
        matches.sort_by_key(|(a, _, seconds)| (*seconds, a.activity_id));

        for (rank, (a, km, seconds)) in matches.into_iter().take(races.top_n).enumerate() {
            results.push(RaceResult {
                category: cat.name.clone(),
                rank: rank + 1,
                activity_id: a.activity_id,
                activity_name: a.activity_name.clone(),
                activity_date: a.activity_date.clone(),
                distance_km: *km,
                seconds: *seconds,
                pace_decimal: (*seconds as f64 / 60.0) / km,
                average_heart_rate: a.average_heart_rate,
                max_heart_rate: a.max_heart_rate,
                zone: a.average_heart_rate.map(|bpm| zones.zone_for(bpm)),
            });
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(elapsed: f64, distance: f64) -> StreamRow {
        StreamRow {
            activity_id: 1,
            timestamp: String::new(),
            elapsed_seconds: elapsed,
            latitude: None,
            longitude: None,
            distance: Some(distance),
            speed: None,
            enhanced_speed: None,
            pace: None,
            heart_rate: None,
            cadence: None,
            altitude: None,
            enhanced_altitude: None,
            power: None,
            accumulated_power: None,
            temperature: None,
            step_length: None,
            source_type: "TCX".to_string(),
        }
    }

    fn run(id: i64, km: f64, seconds: i64, hr: Option<i64>) -> ActivityRow {
        ActivityRow {
            activity_id: id,
            activity_date: format!("2024-01-{:02}T08:00:00Z", id),
            activity_name: Some(format!("Run {id}")),
            activity_type: Some("Run".to_string()),
            distance_km: Some(km),
            moving_time: Some(seconds - 10),
            elapsed_time: Some(seconds),
            pace_decimal: None,
            average_heart_rate: hr,
            max_heart_rate: None,
            elevation_gain: None,
            calories: None,
            relative_effort: None,
            commute: None,
            gear: None,
            filename: None,
        }
    }

    #[test]
    fn test_fastest_kilometer() {
        // 250 m every 60 s, except a quick stretch of 250 m in 45 s
        let stream: Vec<StreamRow> = vec![
            point(0.0, 0.0),
            point(60.0, 250.0),
            point(120.0, 500.0),
            point(165.0, 750.0),
            point(225.0, 1000.0),
            point(285.0, 1250.0),
            point(345.0, 1500.0),
        ];
        let efforts = best_efforts(&stream);
        assert_eq!(efforts.len(), 1);
        let km = &efforts[0];
        assert_eq!(km.name, "1k");
        assert_eq!(km.seconds, 225.0);
        assert_eq!(km.start_elapsed, 0.0);
        assert!((km.pace - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_short_stream_has_no_efforts() {
        let stream = vec![point(0.0, 0.0), point(100.0, 400.0)];
        assert!(best_efforts(&stream).is_empty());
        assert!(best_efforts(&[]).is_empty());
    }

    #[test]
    fn test_race_results_ranked() {
        let mut ride = run(9, 5.0, 600, None);
        ride.activity_type = Some("Ride".to_string());
        let activities = vec![
            run(1, 5.0, 1500, Some(150)),
            run(2, 5.1, 1450, Some(170)),
            run(3, 10.0, 3000, None),
            run(4, 7.0, 2000, None),
            ride,
        ];

        let results = race_results(&activities, &RaceConfig::default(), &ZoneConfig::default());
        let fives: Vec<_> = results.iter().filter(|r| r.category == "5k").collect();
        assert_eq!(fives.len(), 2);
        assert_eq!(fives[0].activity_id, 2);
        assert_eq!(fives[0].rank, 1);
        assert_eq!(fives[0].zone, Some(Zone(3)));
        assert_eq!(fives[1].activity_id, 1);
        assert!((fives[1].pace_decimal - 5.0).abs() < 1e-9);

        let tens: Vec<_> = results.iter().filter(|r| r.category == "10k").collect();
        assert_eq!(tens.len(), 1);
        assert_eq!(tens[0].zone, None);
        assert!(results.iter().all(|r| r.activity_id != 4 && r.activity_id != 9));
    }

    #[test]
    fn test_race_results_top_n() {
        let activities: Vec<ActivityRow> =
            (1..=5).map(|i| run(i, 5.0, 1400 + i * 10, None)).collect();
        let races = RaceConfig {
            top_n: 2,
            ..RaceConfig::default()
        };
        let results = race_results(&activities, &races, &ZoneConfig::default());
        let ids: Vec<i64> = results.iter().map(|r| r.activity_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

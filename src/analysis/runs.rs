//! Summary metrics over a set of runs

use serde::Serialize;

use crate::store::ActivityRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub runs: usize,
    pub total_distance_km: f64,
    /// Total moving time over total distance, min/km
    pub average_pace: Option<f64>,
    pub median_pace: Option<f64>,
    pub fastest_pace: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub median_heart_rate: Option<f64>,
    pub max_heart_rate: Option<i64>,
}

/// Runs only, commutes excluded
pub fn is_training_run(a: &ActivityRow) -> bool {
    a.activity_type.as_deref() == Some("Run") && a.commute != Some(true)
}

/// `None` when no training run is in the input
pub fn run_summary(activities: &[ActivityRow]) -> Option<RunSummary> {
    let runs: Vec<&ActivityRow> = activities.iter().filter(|a| is_training_run(a)).collect();
    if runs.is_empty() {
        return None;
    }

    let total_distance_km: f64 = runs.iter().filter_map(|a| a.distance_km).sum();
    let total_moving: i64 = runs.iter().filter_map(|a| a.moving_time).sum();
    let average_pace =
        (total_distance_km > 0.0).then(|| (total_moving as f64 / 60.0) / total_distance_km);

    let paces: Vec<f64> = runs
        .iter()
        .filter(|a| a.distance_km.is_some_and(|km| km > 0.0))
        .filter_map(|a| a.pace_decimal)
        .collect();
    let heart_rates: Vec<f64> = runs
        .iter()
        .filter_map(|a| a.average_heart_rate)
        .map(|v| v as f64)
        .collect();

    Some(RunSummary {
        runs: runs.len(),
        total_distance_km,
        average_pace,
        median_pace: median(&paces),
        fastest_pace: paces.iter().copied().reduce(f64::min),
        average_heart_rate: (!heart_rates.is_empty())
            .then(|| heart_rates.iter().sum::<f64>() / heart_rates.len() as f64),
        median_heart_rate: median(&heart_rates),
        max_heart_rate: runs.iter().filter_map(|a| a.max_heart_rate).max(),
    })
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

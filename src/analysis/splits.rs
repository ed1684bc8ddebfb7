//! Whole-kilometer splits from a stream

use serde::Serialize;

use crate::store::StreamRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Split {
    /// 1-based kilometer number
    pub km: usize,
    /// Distance actually covered by the samples in this split, km
    pub distance_km: f64,
    pub seconds: f64,
    /// Minutes per kilometer
    pub pace: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub average_cadence: Option<f64>,
}

/// Consecutive full kilometers; a partial final kilometer is left out
pub fn kilometer_splits(stream: &[StreamRow]) -> Vec<Split> {
    let max_distance = stream
        .iter()
        .filter_map(|s| s.distance)
        .fold(0.0_f64, f64::max);
    let full_km = (max_distance / 1000.0).floor() as usize;

    (0..full_km)
        .filter_map(|k| {
            let lo = k as f64 * 1000.0;
            let hi = lo + 1000.0;
            let rows: Vec<&StreamRow> = stream
                .iter()
                .filter(|s| s.distance.map_or(false, |d| d >= lo && d < hi))
                .collect();
            let (first, last) = (rows.first()?, rows.last()?);

            let distance_km = (last.distance? - first.distance?) / 1000.0;
            let seconds = last.elapsed_seconds - first.elapsed_seconds;
            let pace = (distance_km > 0.0).then(|| (seconds / 60.0) / distance_km);

            Some(Split {
                km: k + 1,
                distance_km,
                seconds,
                pace,
                average_heart_rate: mean(rows.iter().filter_map(|s| s.heart_rate)),
                average_cadence: mean(rows.iter().filter_map(|s| s.cadence)),
            })
        })
        .collect()
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, n) = values.fold((0i64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(elapsed: f64, distance: f64, hr: i64) -> StreamRow {
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
            heart_rate: Some(hr),
            cadence: None,
            altitude: None,
            enhanced_altitude: None,
            power: None,
            accumulated_power: None,
            temperature: None,
            step_length: None,
            source_type: "FIT".to_string(),
        }
    }

    #[test]
    fn test_splits() {
        // 100 m every 30 s over 2.5 km
        let stream: Vec<StreamRow> = (0..=25)
            .map(|i| row(i as f64 * 30.0, i as f64 * 100.0, 140 + (i / 10) as i64 * 10))
            .collect();

        let splits = kilometer_splits(&stream);
        assert_eq!(splits.len(), 2);

        let first = &splits[0];
        assert_eq!(first.km, 1);
        assert!((first.distance_km - 0.9).abs() < 1e-9);
        assert_eq!(first.seconds, 270.0);
        assert!((first.pace.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(first.average_heart_rate, Some(140.0));
        assert_eq!(first.average_cadence, None);

        assert_eq!(splits[1].average_heart_rate, Some(150.0));
    }

    #[test]
    fn test_short_stream_has_no_splits() {
        let stream = vec![row(0.0, 0.0, 120), row(60.0, 400.0, 130)];
        assert!(kilometer_splits(&stream).is_empty());
    }
}

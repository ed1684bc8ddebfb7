//! Pace estimated from cumulative distance, for streams recorded without speed

use crate::store::StreamRow;

/// Trailing window for the distance-derived speed estimate
const SMOOTHING_WINDOW: usize = 10;

/// Per-row pace in min/km
///
/// Rows with a stored pace keep it. When no row in the stream carries
/// speed, pace is estimated from successive distance and elapsed-time
/// deltas, smoothed over a trailing window. Nothing is written back.
pub fn smoothed_pace(stream: &[StreamRow]) -> Vec<Option<f64>> {
    if stream.iter().any(|s| s.speed.is_some()) {
        return stream.iter().map(|s| s.pace).collect();
    }

    let mut window: Vec<f64> = Vec::with_capacity(SMOOTHING_WINDOW);
    let mut prev: Option<(f64, f64)> = None;
    stream
        .iter()
        .map(|row| {
            let current = row.distance.map(|d| (d, row.elapsed_seconds));
            let instant = match (prev, current) {
                (Some((d0, t0)), Some((d1, t1))) if t1 > t0 => Some((d1 - d0) / (t1 - t0)),
                _ => None,
            };
            if current.is_some() {
                prev = current;
            }

            let v = instant?;
            if window.len() == SMOOTHING_WINDOW {
                window.remove(0);
            }
            window.push(v);
            let mean = window.iter().sum::<f64>() / window.len() as f64;
            (mean > 0.0).then(|| 1000.0 / (mean * 60.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(elapsed: f64, distance: Option<f64>, speed: Option<f64>) -> StreamRow {
        StreamRow {
            activity_id: 1,
            timestamp: String::new(),
            elapsed_seconds: elapsed,
            latitude: None,
            longitude: None,
            distance,
            speed,
            enhanced_speed: None,
            pace: speed.filter(|s| *s > 0.0).map(|s| 1000.0 / (s * 60.0)),
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

    #[test]
    fn test_estimate_from_distance() {
        let stream: Vec<StreamRow> = (0..5)
            .map(|i| row(i as f64 * 4.0, Some(i as f64 * 10.0), None))
            .collect();
        let pace = smoothed_pace(&stream);
        // first row has nothing to difference against
        assert_eq!(pace[0], None);
        for p in &pace[1..] {
            assert!((p.unwrap() - 6.6667).abs() < 1e-3);
        }
    }

    #[test]
    fn test_stored_pace_wins() {
        let stream = vec![row(0.0, Some(0.0), Some(2.5)), row(4.0, Some(40.0), None)];
        let pace = smoothed_pace(&stream);
        assert!((pace[0].unwrap() - 6.6667).abs() < 1e-3);
        assert_eq!(pace[1], None);
    }

    #[test]
    fn test_standing_still() {
        let stream = vec![row(0.0, Some(5.0), None), row(4.0, Some(5.0), None)];
        assert_eq!(smoothed_pace(&stream), vec![None, None]);
    }
}

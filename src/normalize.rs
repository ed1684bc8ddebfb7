//! Raw track samples → stored stream rows
//!
//! Samples are stably sorted by timestamp, offset from the activity start,
//! given a pace, and tagged with the format they came from. Enhanced speed
//! and altitude win over the legacy fields; both stay on the row. Pace is
//! only ever derived from a positive speed.

use chrono::{DateTime, Utc};

use crate::model::{SourceFormat, StreamSample};
use crate::track::RawSample;

/// Result of normalizing one track file
#[derive(Debug, Clone, Default)]
pub struct NormalizedStream {
    pub samples: Vec<StreamSample>,
    /// Rows whose timestamp preceded the activity start
    pub suspect: usize,
    /// Rows dropped for lack of a timestamp
    pub untimed: usize,
}

/// Minutes per kilometer for a speed in m/s; `None` unless speed is positive
pub fn pace_from_speed(speed: Option<f64>) -> Option<f64> {
    match speed {
        Some(s) if s > 0.0 && s.is_finite() => Some(1000.0 / (s * 60.0)),
        _ => None,
    }
}

pub fn normalize(
    activity_id: i64,
    start_time: DateTime<Utc>,
    format: SourceFormat,
    raw: Vec<RawSample>,
) -> NormalizedStream {
    let total = raw.len();
    let mut timed: Vec<(DateTime<Utc>, RawSample)> = raw
        .into_iter()
        .filter_map(|s| s.timestamp.map(|ts| (ts, s)))
        .collect();
    let untimed = total - timed.len();
    if untimed > 0 {
        tracing::debug!(activity_id, untimed, "Dropped samples without a timestamp");
    }

    // sort_by_key is stable: equal timestamps keep file order
    timed.sort_by_key(|(ts, _)| *ts);

    let mut suspect = 0;
    let samples: Vec<StreamSample> = timed
        .into_iter()
        .map(|(timestamp, raw)| {
            let offset = (timestamp - start_time).num_milliseconds() as f64 / 1000.0;
            let elapsed_seconds = if offset < 0.0 {
                suspect += 1;
                0.0
            } else {
                offset
            };

            let speed = raw.enhanced_speed.or(raw.speed);
            StreamSample {
                activity_id,
                timestamp,
                elapsed_seconds,
                latitude: raw.latitude,
                longitude: raw.longitude,
                distance: raw.distance,
                speed,
                enhanced_speed: raw.enhanced_speed,
                pace: pace_from_speed(speed),
                heart_rate: raw.heart_rate,
                cadence: raw.cadence,
                altitude: raw.enhanced_altitude.or(raw.altitude),
                enhanced_altitude: raw.enhanced_altitude,
                power: raw.power,
                accumulated_power: raw.accumulated_power,
                temperature: raw.temperature,
                step_length: raw.step_length,
                source_format: format,
            }
        })
        .collect();

    if suspect > 0 {
        tracing::warn!(
            activity_id,
            suspect,
            start = %start_time,
            "Samples precede the activity start; elapsed time clamped to zero"
        );
    }

    NormalizedStream {
        samples,
        suspect,
        untimed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 6, 0, 0).unwrap()
    }

    fn at(secs: i64) -> RawSample {
        RawSample {
            timestamp: Some(start() + Duration::seconds(secs)),
            ..RawSample::default()
        }
    }

    #[test]
    fn test_pace_from_speed() {
        assert_eq!(pace_from_speed(None), None);
        assert_eq!(pace_from_speed(Some(0.0)), None);
        assert_eq!(pace_from_speed(Some(-1.0)), None);
        let pace = pace_from_speed(Some(2.5)).unwrap();
        assert!((pace - 6.6667).abs() < 1e-3);
    }

    #[test]
    fn test_sorted_stably_and_elapsed_non_decreasing() {
        let mut a = at(10);
        a.heart_rate = Some(1);
        let mut b = at(5);
        b.heart_rate = Some(2);
        let mut c = at(10);
        c.heart_rate = Some(3);

        let out = normalize(7, start(), SourceFormat::Tcx, vec![a, b, c]);
        let hrs: Vec<_> = out.samples.iter().map(|s| s.heart_rate).collect();
        assert_eq!(hrs, vec![Some(2), Some(1), Some(3)]);

        let elapsed: Vec<_> = out.samples.iter().map(|s| s.elapsed_seconds).collect();
        assert_eq!(elapsed, vec![5.0, 10.0, 10.0]);
        assert!(out.samples.iter().all(|s| s.activity_id == 7));
        assert!(out
            .samples
            .iter()
            .all(|s| s.source_format == SourceFormat::Tcx));
    }

    #[test]
    fn test_negative_offset_clamped_and_flagged() {
        let out = normalize(1, start(), SourceFormat::Fit, vec![at(-3), at(0), at(2)]);
        assert_eq!(out.suspect, 1);
        assert_eq!(out.samples.len(), 3);
        assert_eq!(out.samples[0].elapsed_seconds, 0.0);
    }

    #[test]
    fn test_enhanced_fields_win() {
        let mut s = at(0);
        s.altitude = Some(10.0);
        s.enhanced_altitude = Some(10.4);
        s.speed = Some(2.0);
        s.enhanced_speed = Some(2.5);

        let out = normalize(1, start(), SourceFormat::Fit, vec![s]);
        let row = &out.samples[0];
        assert_eq!(row.altitude, Some(10.4));
        assert_eq!(row.enhanced_altitude, Some(10.4));
        assert_eq!(row.speed, Some(2.5));
        assert_eq!(row.enhanced_speed, Some(2.5));
        assert!((row.pace.unwrap() - 6.6667).abs() < 1e-3);
    }

    #[test]
    fn test_legacy_fields_when_no_enhanced() {
        let mut s = at(0);
        s.altitude = Some(10.0);
        s.speed = Some(0.0);
        let out = normalize(1, start(), SourceFormat::Fit, vec![s, at(1)]);
        assert_eq!(out.samples[0].altitude, Some(10.0));
        assert_eq!(out.samples[0].enhanced_altitude, None);
        assert_eq!(out.samples[0].pace, None);
    }

    #[test]
    fn test_empty_and_untimed_input() {
        let out = normalize(1, start(), SourceFormat::Tcx, vec![]);
        assert!(out.samples.is_empty());

        let out = normalize(1, start(), SourceFormat::Tcx, vec![RawSample::default(), at(1)]);
        assert_eq!(out.untimed, 1);
        assert_eq!(out.samples.len(), 1);
    }

    #[test]
    fn test_no_pace_without_speed() {
        let raw: Vec<RawSample> = (0..3)
            .map(|i| {
                let mut s = at(i * 4);
                s.distance = Some(i as f64 * 10.0);
                s
            })
            .collect();

        let out = normalize(1, start(), SourceFormat::Tcx, raw);
        assert_eq!(out.samples.len(), 3);
        for s in &out.samples {
            assert_eq!(s.speed, None);
            assert_eq!(s.pace, None);
        }
    }
}

//! FIT adapter
//!
//! Only `record` messages carry samples. Scale and offset from the FIT profile
//! are already applied by the decoder; positions still arrive as semicircles.

use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::Value;

use super::RawSample;
use crate::error::TrackError;

const SEMICIRCLE_TO_DEGREES: f64 = 180.0 / 2_147_483_648.0;

pub(super) fn parse(bytes: &[u8]) -> Result<Vec<RawSample>, TrackError> {
    let records = fitparser::from_bytes(bytes).map_err(|e| TrackError::Fit(e.to_string()))?;

    let samples = records
        .iter()
        .filter(|r| r.kind() == MesgNum::Record)
        .map(|r| sample_from_fields(r.fields().iter().map(|f| (f.name(), f.value()))))
        .collect();
    Ok(samples)
}

/// Map the named fields of one record message onto a sample
pub(super) fn sample_from_fields<'a>(
    fields: impl Iterator<Item = (&'a str, &'a Value)>,
) -> RawSample {
    let mut sample = RawSample::default();
    for (name, value) in fields {
        match name {
            "timestamp" => sample.timestamp = as_timestamp(value),
            "position_lat" => sample.latitude = as_f64(value).map(|v| v * SEMICIRCLE_TO_DEGREES),
            "position_long" => {
                sample.longitude = as_f64(value).map(|v| v * SEMICIRCLE_TO_DEGREES)
            }
            "distance" => sample.distance = as_f64(value),
            "speed" => sample.speed = as_f64(value),
            "enhanced_speed" => sample.enhanced_speed = as_f64(value),
            "altitude" => sample.altitude = as_f64(value),
            "enhanced_altitude" => sample.enhanced_altitude = as_f64(value),
            "heart_rate" => sample.heart_rate = as_i64(value),
            "cadence" => sample.cadence = as_i64(value),
            "power" => sample.power = as_i64(value),
            "accumulated_power" => sample.accumulated_power = as_i64(value),
            "temperature" => sample.temperature = as_f64(value),
            // millimeters
            "step_length" => sample.step_length = as_f64(value).map(|v| v / 1000.0),
            _ => {}
        }
    }
    sample
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => Some(ts.with_timezone(&Utc)),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Float64(v) => *v,
        Value::Float32(v) => *v as f64,
        Value::SInt8(v) => *v as f64,
        Value::UInt8(v) | Value::UInt8z(v) | Value::Byte(v) => *v as f64,
        Value::SInt16(v) => *v as f64,
        Value::UInt16(v) | Value::UInt16z(v) => *v as f64,
        Value::SInt32(v) => *v as f64,
        Value::UInt32(v) | Value::UInt32z(v) => *v as f64,
        Value::SInt64(v) => *v as f64,
        Value::UInt64(v) | Value::UInt64z(v) => *v as f64,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn as_i64(value: &Value) -> Option<i64> {
    as_f64(value).map(|v| v.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn fields(pairs: &[(&'static str, Value)]) -> RawSample {
        sample_from_fields(pairs.iter().map(|(n, v)| (*n, v)))
    }

    #[test]
    fn test_record_mapping() {
        let ts = Local.timestamp_opt(1_714_802_400, 0).unwrap();
        let sample = fields(&[
            ("timestamp", Value::Timestamp(ts)),
            ("position_lat", Value::SInt32(624_750_000)),
            ("position_long", Value::SInt32(58_400_000)),
            ("distance", Value::Float64(1520.4)),
            ("speed", Value::Float64(2.9)),
            ("enhanced_speed", Value::Float64(2.913)),
            ("altitude", Value::Float64(12.0)),
            ("enhanced_altitude", Value::Float64(12.4)),
            ("heart_rate", Value::UInt8(151)),
            ("cadence", Value::UInt8(86)),
            ("temperature", Value::SInt8(18)),
            ("step_length", Value::Float64(1130.0)),
            ("accumulated_power", Value::UInt32(51_000)),
        ]);

        assert_eq!(
            sample.timestamp,
            Some(Utc.timestamp_opt(1_714_802_400, 0).unwrap())
        );
        let lat = sample.latitude.unwrap();
        assert!((lat - 52.36594).abs() < 1e-4, "lat {lat}");
        assert!(sample.longitude.unwrap() > 4.8 && sample.longitude.unwrap() < 4.9);
        assert_eq!(sample.speed, Some(2.9));
        assert_eq!(sample.enhanced_speed, Some(2.913));
        assert_eq!(sample.altitude, Some(12.0));
        assert_eq!(sample.enhanced_altitude, Some(12.4));
        assert_eq!(sample.heart_rate, Some(151));
        assert_eq!(sample.cadence, Some(86));
        assert_eq!(sample.temperature, Some(18.0));
        assert_eq!(sample.step_length, Some(1.13));
        assert_eq!(sample.accumulated_power, Some(51_000));
        assert_eq!(sample.power, None);
    }

    #[test]
    fn test_non_numeric_values_are_absent() {
        let sample = fields(&[
            ("heart_rate", Value::String("n/a".to_string())),
            ("unknown_field_99", Value::UInt8(3)),
        ]);
        assert_eq!(sample, RawSample::default());
    }

    #[test]
    fn test_corrupt_bytes() {
        let err = parse(b"definitely not a fit file").unwrap_err();
        assert!(matches!(err, TrackError::Fit(_)));
    }
}

//! Activity and stream records as they are stored

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Track-file format that produced a stream row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Training Center XML
    Tcx,
    /// Flexible and Interoperable Data Transfer (binary)
    Fit,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Tcx => "TCX",
            SourceFormat::Fit => "FIT",
        }
    }
}

/// One recorded workout, mapped from a row of the activity export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: i64,
    pub activity_date: DateTime<Utc>,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub activity_description: Option<String>,
    /// Seconds
    pub elapsed_time: Option<i64>,
    /// Seconds
    pub moving_time: Option<i64>,
    /// Meters
    pub distance: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_speed: Option<f64>,
    pub elevation_gain: Option<f64>,
    pub elevation_loss: Option<f64>,
    pub elevation_low: Option<f64>,
    pub elevation_high: Option<f64>,
    pub max_grade: Option<f64>,
    pub average_grade: Option<f64>,
    pub max_heart_rate: Option<i64>,
    pub average_heart_rate: Option<i64>,
    pub max_cadence: Option<i64>,
    pub average_cadence: Option<i64>,
    pub max_watts: Option<i64>,
    pub average_watts: Option<i64>,
    pub weighted_average_power: Option<i64>,
    pub calories: Option<i64>,
    /// Opaque score carried through from the export
    pub relative_effort: Option<i64>,
    pub total_work: Option<i64>,
    pub max_temperature: Option<f64>,
    pub average_temperature: Option<f64>,
    pub athlete_weight: Option<f64>,
    pub commute: Option<bool>,
    pub gear: Option<String>,
    pub filename: Option<String>,
}

impl Activity {
    /// An activity with only its required fields set
    pub fn new(activity_id: i64, activity_date: DateTime<Utc>) -> Self {
        Self {
            activity_id,
            activity_date,
            activity_name: None,
            activity_type: None,
            activity_description: None,
            elapsed_time: None,
            moving_time: None,
            distance: None,
            max_speed: None,
            average_speed: None,
            elevation_gain: None,
            elevation_loss: None,
            elevation_low: None,
            elevation_high: None,
            max_grade: None,
            average_grade: None,
            max_heart_rate: None,
            average_heart_rate: None,
            max_cadence: None,
            average_cadence: None,
            max_watts: None,
            average_watts: None,
            weighted_average_power: None,
            calories: None,
            relative_effort: None,
            total_work: None,
            max_temperature: None,
            average_temperature: None,
            athlete_weight: None,
            commute: None,
            gear: None,
            filename: None,
        }
    }

    /// Extrema that do not bound their averages, as (field, max, average)
    pub fn unbounded_extrema(&self) -> Vec<(&'static str, f64, f64)> {
        let pairs = [
            ("speed", self.max_speed, self.average_speed),
            ("grade", self.max_grade, self.average_grade),
            (
                "heart_rate",
                self.max_heart_rate.map(|v| v as f64),
                self.average_heart_rate.map(|v| v as f64),
            ),
            (
                "cadence",
                self.max_cadence.map(|v| v as f64),
                self.average_cadence.map(|v| v as f64),
            ),
            (
                "watts",
                self.max_watts.map(|v| v as f64),
                self.average_watts.map(|v| v as f64),
            ),
            (
                "temperature",
                self.max_temperature,
                self.average_temperature,
            ),
        ];

        pairs
            .into_iter()
            .filter_map(|(name, max, avg)| match (max, avg) {
                (Some(max), Some(avg)) if max < avg => Some((name, max, avg)),
                _ => None,
            })
            .collect()
    }

    /// SHA-256 over the serialized record, used to detect unchanged re-imports
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// One normalized time-series reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSample {
    pub activity_id: i64,
    pub timestamp: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Cumulative meters
    pub distance: Option<f64>,
    /// Effective speed in m/s (enhanced when available)
    pub speed: Option<f64>,
    pub enhanced_speed: Option<f64>,
    /// Minutes per kilometer
    pub pace: Option<f64>,
    pub heart_rate: Option<i64>,
    pub cadence: Option<i64>,
    /// Effective altitude in meters (enhanced when available)
    pub altitude: Option<f64>,
    pub enhanced_altitude: Option<f64>,
    pub power: Option<i64>,
    pub accumulated_power: Option<i64>,
    pub temperature: Option<f64>,
    /// Meters
    pub step_length: Option<f64>,
    pub source_format: SourceFormat,
}

/// SHA-256 over an ordered stream set
pub fn stream_fingerprint(samples: &[StreamSample]) -> String {
    let bytes = serde_json::to_vec(samples).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

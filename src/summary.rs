//! Activity export (CSV) → `Activity` records
//!
//! Only the identifier and the date are required. Any other column that is
//! blank or fails to parse becomes `None` and the row is still imported.
//! Exports repeat some column names (a second "Distance" in meters, a second
//! "Elapsed Time"); the first occurrence is the one read.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::io::Read;

use crate::config::DistanceUnit;
use crate::error::RowError;
use crate::model::Activity;

const ACTIVITY_ID: &str = "Activity ID";
const ACTIVITY_DATE: &str = "Activity Date";

const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y, %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Reads the export and yields one result per data row
pub struct ExportReader<R: Read> {
    reader: csv::Reader<R>,
    columns: HashMap<String, usize>,
    unit: DistanceUnit,
    row: usize,
}

impl<R: Read> ExportReader<R> {
    pub fn new(source: R, unit: DistanceUnit) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut columns = HashMap::new();
        for (idx, name) in reader.headers()?.iter().enumerate() {
            columns.entry(name.to_string()).or_insert(idx);
        }

        Ok(Self {
            reader,
            columns,
            unit,
            row: 0,
        })
    }
}

impl<R: Read> Iterator for ExportReader<R> {
    type Item = Result<Activity, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();
        self.row += 1;
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                let row = ExportRow {
                    columns: &self.columns,
                    record: &record,
                };
                Some(activity_from_row(self.row, &row, self.unit))
            }
            Err(e) => Some(Err(RowError::Malformed {
                row: self.row,
                message: e.to_string(),
            })),
        }
    }
}

/// Named access to one export record
pub struct ExportRow<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> ExportRow<'a> {
    /// Trimmed, non-empty value of a column
    fn get(&self, column: &str) -> Option<&'a str> {
        let idx = *self.columns.get(column)?;
        self.record.get(idx).filter(|v| !v.is_empty())
    }

    fn string(&self, column: &str) -> Option<String> {
        self.get(column).map(String::from)
    }

    fn real(&self, column: &str) -> Option<f64> {
        let value = self.get(column)?;
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                field_dropped(column, value);
                None
            }
        }
    }

    fn integer(&self, column: &str) -> Option<i64> {
        let value = self.get(column)?;
        if let Ok(v) = value.parse::<i64>() {
            return Some(v);
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v.trunc() as i64),
            _ => {
                field_dropped(column, value);
                None
            }
        }
    }

    fn boolean(&self, column: &str) -> Option<bool> {
        let value = self.get(column)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => {
                field_dropped(column, value);
                None
            }
        }
    }
}

fn field_dropped(column: &str, value: &str) {
    tracing::debug!(column, value, "Unparseable field stored as null");
}

/// Parse the export's date column; naive values are taken as UTC
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn activity_from_row(
    row: usize,
    fields: &ExportRow,
    unit: DistanceUnit,
) -> Result<Activity, RowError> {
    let id_value = fields.get(ACTIVITY_ID).ok_or(RowError::Missing {
        row,
        column: ACTIVITY_ID,
    })?;
    let activity_id = id_value.parse::<i64>().map_err(|_| RowError::Invalid {
        row,
        column: ACTIVITY_ID,
        value: id_value.to_string(),
    })?;

    let date_value = fields.get(ACTIVITY_DATE).ok_or(RowError::Missing {
        row,
        column: ACTIVITY_DATE,
    })?;
    let activity_date = parse_date(date_value).ok_or_else(|| RowError::Invalid {
        row,
        column: ACTIVITY_DATE,
        value: date_value.to_string(),
    })?;

    let mut activity = Activity::new(activity_id, activity_date);
    activity.activity_name = fields.string("Activity Name");
    activity.activity_type = fields.string("Activity Type");
    activity.activity_description = fields.string("Activity Description");

    activity.elapsed_time = fields.integer("Elapsed Time");
    activity.moving_time = fields.integer("Moving Time");
    activity.distance = fields.real("Distance").map(|d| d * unit.to_meters());

    activity.max_speed = fields.real("Max Speed");
    activity.average_speed = fields.real("Average Speed");
    activity.elevation_gain = fields.real("Elevation Gain");
    activity.elevation_loss = fields.real("Elevation Loss");
    activity.elevation_low = fields.real("Elevation Low");
    activity.elevation_high = fields.real("Elevation High");
    activity.max_grade = fields.real("Max Grade");
    activity.average_grade = fields.real("Average Grade");

    activity.max_heart_rate = fields.integer("Max Heart Rate");
    activity.average_heart_rate = fields.integer("Average Heart Rate");
    activity.max_cadence = fields.integer("Max Cadence");
    activity.average_cadence = fields.integer("Average Cadence");
    activity.max_watts = fields.integer("Max Watts");
    activity.average_watts = fields.integer("Average Watts");
    activity.weighted_average_power = fields.integer("Weighted Average Power");
    activity.calories = fields.integer("Calories");
    activity.relative_effort = fields.integer("Relative Effort");
    activity.total_work = fields.integer("Total Work");
    activity.max_temperature = fields.real("Max Temperature");
    activity.average_temperature = fields.real("Average Temperature");
    activity.athlete_weight = fields.real("Athlete Weight");

    activity.commute = fields.boolean("Commute");
    activity.gear = fields.string("Activity Gear");
    activity.filename = fields.string("Filename");

    check_invariants(&mut activity);
    Ok(activity)
}

/// Moving time is capped at elapsed time; unbounded extrema are only reported
fn check_invariants(activity: &mut Activity) {
    if let (Some(moving), Some(elapsed)) = (activity.moving_time, activity.elapsed_time) {
        if moving > elapsed {
            tracing::warn!(
                activity_id = activity.activity_id,
                moving,
                elapsed,
                "Moving time exceeds elapsed time; capped"
            );
            activity.moving_time = Some(elapsed);
        }
    }
    for (field, max, avg) in activity.unbounded_extrema() {
        tracing::warn!(
            activity_id = activity.activity_id,
            field,
            max,
            avg,
            "Maximum below average"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HEADER: &str = "Activity ID,Activity Date,Activity Name,Activity Type,Elapsed Time,Distance,Moving Time,Average Heart Rate,Commute,Filename,Distance";

    fn read(body: &str, unit: DistanceUnit) -> Vec<Result<Activity, RowError>> {
        let csv = format!("{HEADER}\n{body}");
        ExportReader::new(csv.as_bytes(), unit).unwrap().collect()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_date("Jan 1, 2023, 10:00:00 AM"), Some(expected));
        assert_eq!(parse_date("2023-01-01 10:00:00"), Some(expected));
        assert_eq!(parse_date("2023-01-01T10:00:00Z"), Some(expected));
        assert_eq!(
            parse_date("2023-01-01"),
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_full_row() {
        let rows = read(
            "101,\"Jan 1, 2023, 10:00:00 AM\",Morning Run,Run,1900,5.02,1800,152.6,false,activities/101.fit.gz,5020.3",
            DistanceUnit::Kilometers,
        );
        let a = rows[0].as_ref().unwrap();
        assert_eq!(a.activity_id, 101);
        assert_eq!(a.activity_name.as_deref(), Some("Morning Run"));
        assert_eq!(a.elapsed_time, Some(1900));
        assert_eq!(a.moving_time, Some(1800));
        // first "Distance" column, in km
        assert!((a.distance.unwrap() - 5020.0).abs() < 1e-6);
        assert_eq!(a.average_heart_rate, Some(152));
        assert_eq!(a.commute, Some(false));
        assert_eq!(a.filename.as_deref(), Some("activities/101.fit.gz"));
    }

    #[test]
    fn test_blank_and_bad_fields_become_null() {
        let rows = read(
            "102,2023-02-01 08:00:00,,Ride,abc,,,,maybe,,",
            DistanceUnit::Meters,
        );
        let a = rows[0].as_ref().unwrap();
        assert_eq!(a.activity_name, None);
        assert_eq!(a.elapsed_time, None);
        assert_eq!(a.distance, None);
        assert_eq!(a.commute, None);
        assert_eq!(a.activity_type.as_deref(), Some("Ride"));
    }

    #[test]
    fn test_meters_unit() {
        let rows = read("103,2023-02-01,,Run,,5000,,,,,", DistanceUnit::Meters);
        assert_eq!(rows[0].as_ref().unwrap().distance, Some(5000.0));
    }

    #[test]
    fn test_required_fields_reject_row() {
        let rows = read(
            "abc,2023-02-01,,,,,,,,,\n,2023-02-01,,,,,,,,,\n104,not a date,,,,,,,,,\n105,2023-02-01,,,,,,,,,",
            DistanceUnit::Kilometers,
        );
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            Err(RowError::Invalid {
                row: 1,
                column: ACTIVITY_ID,
                value: "abc".to_string()
            })
        );
        assert_eq!(
            rows[1],
            Err(RowError::Missing {
                row: 2,
                column: ACTIVITY_ID
            })
        );
        assert!(matches!(
            rows[2],
            Err(RowError::Invalid {
                column: ACTIVITY_DATE,
                ..
            })
        ));
        assert!(rows[3].is_ok());
    }

    #[test]
    fn test_moving_time_capped() {
        let rows = read("106,2023-02-01,,Run,100,,120,,,,", DistanceUnit::Kilometers);
        assert_eq!(rows[0].as_ref().unwrap().moving_time, Some(100));
    }
}

//! Activity storage with SQLite
//!
//! Writes follow replace semantics: an activity row is upserted by its source
//! id, a stream set is swapped out whole inside one transaction. Reads go
//! through the parameterized statements in `queries/`.

mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::model::{stream_fingerprint, Activity, StreamSample};

pub use schema::SCHEMA;

const LIST_ACTIVITIES: &str = include_str!("queries/list_activities.sql");
const ACTIVITIES_WITH_STREAMS: &str = include_str!("queries/activities_with_streams.sql");
const ACTIVITY_STREAM: &str = include_str!("queries/activity_stream.sql");
const TYPE_SUMMARY: &str = include_str!("queries/type_summary.sql");

/// What an activity upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// What a stream replacement did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Old rows (if any) deleted and the new set written
    Replaced { rows: usize, previous: bool },
    /// Stored set already has this fingerprint
    Unchanged,
    /// Nothing to write; existing rows left alone
    Empty,
    /// No activity with this id
    MissingActivity,
}

/// Parameters of the activity list query; every field narrows the result
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActivityFilter {
    pub activity_type: Option<String>,
    /// First calendar day included
    pub since: Option<NaiveDate>,
    /// Last calendar day included
    pub until: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl ActivityFilter {
    pub fn of_type(activity_type: &str) -> Self {
        Self {
            activity_type: Some(activity_type.to_string()),
            ..Self::default()
        }
    }
}

/// Identifies the store contents for cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreVersion {
    pub modified: Option<SystemTime>,
    pub generation: u64,
}

pub struct ActivityStore {
    conn: Connection,
    path: Option<PathBuf>,
    generation: Cell<u64>,
}

impl ActivityStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
            generation: Cell::new(0),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
            generation: Cell::new(0),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn version(&self) -> StoreVersion {
        let modified = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .and_then(|m| m.modified().ok());
        StoreVersion {
            modified,
            generation: self.generation.get(),
        }
    }

    fn bump(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    // ============================================
    // ACTIVITIES
    // ============================================

    /// Insert or update activities in one transaction
    pub fn upsert_activities(&self, activities: &[Activity]) -> Result<Vec<UpsertOutcome>> {
        let tx = self.conn.unchecked_transaction()?;
        let outcomes = activities
            .iter()
            .map(|a| upsert_activity(&tx, a))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;

        if outcomes.iter().any(|o| *o != UpsertOutcome::Unchanged) {
            self.bump();
        }
        Ok(outcomes)
    }

    pub fn upsert_activity(&self, activity: &Activity) -> Result<UpsertOutcome> {
        let outcome = upsert_activity(&self.conn, activity)?;
        if outcome != UpsertOutcome::Unchanged {
            self.bump();
        }
        Ok(outcome)
    }

    pub fn activity_exists(&self, activity_id: i64) -> Result<bool> {
        activity_exists(&self.conn, activity_id)
    }

    /// Recorded start of an activity
    pub fn activity_start(&self, activity_id: i64) -> Result<Option<DateTime<Utc>>> {
        let result = self.conn.query_row(
            "SELECT activity_date FROM activities WHERE activity_id = ?",
            params![activity_id],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(date) => {
                let parsed = DateTime::parse_from_rfc3339(&date)
                    .with_context(|| format!("Stored date '{}' is not RFC 3339", date))?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an activity; its streams follow by cascade
    pub fn delete_activity(&self, activity_id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM activities WHERE activity_id = ?",
            params![activity_id],
        )?;
        if deleted > 0 {
            self.bump();
        }
        Ok(deleted > 0)
    }

    // ============================================
    // STREAMS
    // ============================================

    pub fn has_streams(&self, activity_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM stream_sets WHERE activity_id = ?",
            params![activity_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace the whole stream set of one activity atomically
    pub fn replace_streams(
        &self,
        activity_id: i64,
        source_file: &str,
        samples: &[StreamSample],
    ) -> Result<StreamOutcome> {
        if samples.is_empty() {
            return Ok(StreamOutcome::Empty);
        }

        let tx = self.conn.unchecked_transaction()?;

        if !activity_exists(&tx, activity_id)? {
            return Ok(StreamOutcome::MissingActivity);
        }

        let hash = stream_fingerprint(samples);
        let existing: Option<String> = match tx.query_row(
            "SELECT content_hash FROM stream_sets WHERE activity_id = ?",
            params![activity_id],
            |row| row.get(0),
        ) {
            Ok(h) => Some(h),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        if existing.as_deref() == Some(hash.as_str()) {
            return Ok(StreamOutcome::Unchanged);
        }

        let removed = tx.execute(
            "DELETE FROM activity_streams WHERE activity_id = ?",
            params![activity_id],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO activity_streams
                   (activity_id, timestamp, elapsed_seconds, latitude, longitude, distance,
                    speed, enhanced_speed, pace, heart_rate, cadence, altitude,
                    enhanced_altitude, power, accumulated_power, temperature, step_length,
                    source_type)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;
            for s in samples {
                stmt.execute(params![
                    activity_id,
                    s.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                    s.elapsed_seconds,
                    s.latitude,
                    s.longitude,
                    s.distance,
                    s.speed,
                    s.enhanced_speed,
                    s.pace,
                    s.heart_rate,
                    s.cadence,
                    s.altitude,
                    s.enhanced_altitude,
                    s.power,
                    s.accumulated_power,
                    s.temperature,
                    s.step_length,
                    s.source_format.as_str(),
                ])?;
            }
        }

        tx.execute(
            r#"INSERT INTO stream_sets
               (activity_id, source_file, source_format, sample_count, content_hash, imported_at)
               VALUES (?, ?, ?, ?, ?, datetime('now'))
               ON CONFLICT(activity_id) DO UPDATE SET
                   source_file = excluded.source_file,
                   source_format = excluded.source_format,
                   sample_count = excluded.sample_count,
                   content_hash = excluded.content_hash,
                   imported_at = excluded.imported_at"#,
            params![
                activity_id,
                source_file,
                samples[0].source_format.as_str(),
                samples.len() as i64,
                hash,
            ],
        )?;

        tx.commit()?;
        self.bump();

        Ok(StreamOutcome::Replaced {
            rows: samples.len(),
            previous: existing.is_some() || removed > 0,
        })
    }

    // ============================================
    // QUERIES
    // ============================================

    /// Activities newest first, distance in km
    pub fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRow>> {
        let mut stmt = self.conn.prepare_cached(LIST_ACTIVITIES)?;
        let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
        let day = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());

        let params = params![
            filter.activity_type,
            limit,
            day(filter.since),
            day(filter.until)
        ];
        let rows = stmt.query_map(params, |row| {
            Ok(ActivityRow {
                activity_id: row.get(0)?,
                activity_date: row.get(1)?,
                activity_name: row.get(2)?,
                activity_type: row.get(3)?,
                distance_km: row.get(4)?,
                moving_time: row.get(5)?,
                elapsed_time: row.get(6)?,
                pace_decimal: row.get(7)?,
                average_heart_rate: row.get(8)?,
                max_heart_rate: row.get(9)?,
                elevation_gain: row.get(10)?,
                calories: row.get(11)?,
                relative_effort: row.get(12)?,
                commute: row.get(13)?,
                gear: row.get(14)?,
                filename: row.get(15)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_activities_with_streams(&self) -> Result<Vec<StreamedActivityRow>> {
        let mut stmt = self.conn.prepare_cached(ACTIVITIES_WITH_STREAMS)?;

        let rows = stmt.query_map([], |row| {
            Ok(StreamedActivityRow {
                activity_id: row.get(0)?,
                activity_date: row.get(1)?,
                activity_name: row.get(2)?,
                activity_type: row.get(3)?,
                distance_km: row.get(4)?,
                source_format: row.get(5)?,
                sample_count: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Full stream of one activity in timestamp order
    pub fn get_activity_stream(&self, activity_id: i64) -> Result<Vec<StreamRow>> {
        let mut stmt = self.conn.prepare_cached(ACTIVITY_STREAM)?;

        let rows = stmt.query_map(params![activity_id], |row| {
            Ok(StreamRow {
                activity_id: row.get(0)?,
                timestamp: row.get(1)?,
                elapsed_seconds: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
                distance: row.get(5)?,
                speed: row.get(6)?,
                enhanced_speed: row.get(7)?,
                pace: row.get(8)?,
                heart_rate: row.get(9)?,
                cadence: row.get(10)?,
                altitude: row.get(11)?,
                enhanced_altitude: row.get(12)?,
                power: row.get(13)?,
                accumulated_power: row.get(14)?,
                temperature: row.get(15)?,
                step_length: row.get(16)?,
                source_type: row.get(17)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn type_summary(&self) -> Result<Vec<TypeSummaryRow>> {
        let mut stmt = self.conn.prepare_cached(TYPE_SUMMARY)?;

        let rows = stmt.query_map([], |row| {
            Ok(TypeSummaryRow {
                activity_type: row.get(0)?,
                activity_count: row.get(1)?,
                total_distance_km: row.get(2)?,
                total_moving_time: row.get(3)?,
                average_heart_rate: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        let count = |sql: &str| -> Result<i64> {
            self.conn
                .query_row(sql, [], |row| row.get(0))
                .map_err(Into::into)
        };

        let (first_activity, last_activity): (Option<String>, Option<String>) =
            self.conn.query_row(
                "SELECT MIN(activity_date), MAX(activity_date) FROM activities",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

        let database_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DatabaseStats {
            total_activities: count("SELECT COUNT(*) FROM activities")?,
            activities_with_streams: count("SELECT COUNT(*) FROM stream_sets")?,
            total_stream_records: count("SELECT COUNT(*) FROM activity_streams")?,
            first_activity,
            last_activity,
            activity_types: self.type_summary()?,
            database_size_bytes,
        })
    }
}

fn activity_exists(conn: &Connection, activity_id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE activity_id = ?",
        params![activity_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn upsert_activity(conn: &Connection, a: &Activity) -> Result<UpsertOutcome> {
    let hash = a.fingerprint();
    let existing: Option<String> = match conn.query_row(
        "SELECT content_hash FROM activities WHERE activity_id = ?",
        params![a.activity_id],
        |row| row.get(0),
    ) {
        Ok(h) => Some(h),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    let outcome = match existing {
        None => UpsertOutcome::Inserted,
        Some(ref h) if *h == hash => return Ok(UpsertOutcome::Unchanged),
        Some(_) => UpsertOutcome::Updated,
    };

    conn.execute(
        r#"INSERT INTO activities
           (activity_id, activity_date, activity_name, activity_type, activity_description,
            elapsed_time, moving_time, distance, max_speed, average_speed,
            elevation_gain, elevation_loss, elevation_low, elevation_high,
            max_grade, average_grade, max_heart_rate, average_heart_rate,
            max_cadence, average_cadence, max_watts, average_watts, weighted_average_power,
            calories, relative_effort, total_work, max_temperature, average_temperature,
            athlete_weight, commute, gear, filename, content_hash, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                   ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
           ON CONFLICT(activity_id) DO UPDATE SET
               activity_date = excluded.activity_date,
               activity_name = excluded.activity_name,
               activity_type = excluded.activity_type,
               activity_description = excluded.activity_description,
               elapsed_time = excluded.elapsed_time,
               moving_time = excluded.moving_time,
               distance = excluded.distance,
               max_speed = excluded.max_speed,
               average_speed = excluded.average_speed,
               elevation_gain = excluded.elevation_gain,
               elevation_loss = excluded.elevation_loss,
               elevation_low = excluded.elevation_low,
               elevation_high = excluded.elevation_high,
               max_grade = excluded.max_grade,
               average_grade = excluded.average_grade,
               max_heart_rate = excluded.max_heart_rate,
               average_heart_rate = excluded.average_heart_rate,
               max_cadence = excluded.max_cadence,
               average_cadence = excluded.average_cadence,
               max_watts = excluded.max_watts,
               average_watts = excluded.average_watts,
               weighted_average_power = excluded.weighted_average_power,
               calories = excluded.calories,
               relative_effort = excluded.relative_effort,
               total_work = excluded.total_work,
               max_temperature = excluded.max_temperature,
               average_temperature = excluded.average_temperature,
               athlete_weight = excluded.athlete_weight,
               commute = excluded.commute,
               gear = excluded.gear,
               filename = excluded.filename,
               content_hash = excluded.content_hash,
               updated_at = datetime('now')"#,
        params![
            a.activity_id,
            a.activity_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            a.activity_name,
            a.activity_type,
            a.activity_description,
            a.elapsed_time,
            a.moving_time,
            a.distance,
            a.max_speed,
            a.average_speed,
            a.elevation_gain,
            a.elevation_loss,
            a.elevation_low,
            a.elevation_high,
            a.max_grade,
            a.average_grade,
            a.max_heart_rate,
            a.average_heart_rate,
            a.max_cadence,
            a.average_cadence,
            a.max_watts,
            a.average_watts,
            a.weighted_average_power,
            a.calories,
            a.relative_effort,
            a.total_work,
            a.max_temperature,
            a.average_temperature,
            a.athlete_weight,
            a.commute,
            a.gear,
            a.filename,
            hash,
        ],
    )?;

    Ok(outcome)
}

// ============================================
// ROW TYPES
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub activity_id: i64,
    pub activity_date: String,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub distance_km: Option<f64>,
    pub moving_time: Option<i64>,
    pub elapsed_time: Option<i64>,
    /// Minutes per kilometer over moving time
    pub pace_decimal: Option<f64>,
    pub average_heart_rate: Option<i64>,
    pub max_heart_rate: Option<i64>,
    pub elevation_gain: Option<f64>,
    pub calories: Option<i64>,
    pub relative_effort: Option<i64>,
    pub commute: Option<bool>,
    pub gear: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamedActivityRow {
    pub activity_id: i64,
    pub activity_date: String,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub distance_km: Option<f64>,
    pub source_format: String,
    pub sample_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamRow {
    pub activity_id: i64,
    pub timestamp: String,
    pub elapsed_seconds: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<f64>,
    pub speed: Option<f64>,
    pub enhanced_speed: Option<f64>,
    pub pace: Option<f64>,
    pub heart_rate: Option<i64>,
    pub cadence: Option<i64>,
    pub altitude: Option<f64>,
    pub enhanced_altitude: Option<f64>,
    pub power: Option<i64>,
    pub accumulated_power: Option<i64>,
    pub temperature: Option<f64>,
    pub step_length: Option<f64>,
    pub source_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummaryRow {
    pub activity_type: String,
    pub activity_count: i64,
    pub total_distance_km: Option<f64>,
    pub total_moving_time: Option<i64>,
    pub average_heart_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub total_activities: i64,
    pub activities_with_streams: i64,
    pub total_stream_records: i64,
    pub first_activity: Option<String>,
    pub last_activity: Option<String>,
    pub activity_types: Vec<TypeSummaryRow>,
    pub database_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceFormat;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 6, 30, 0).unwrap()
    }

    fn activity(id: i64) -> Activity {
        let mut a = Activity::new(id, start() + Duration::days(id));
        a.activity_type = Some("Run".to_string());
        a.distance = Some(5000.0);
        a.moving_time = Some(1500);
        a
    }

    fn samples(id: i64, n: i64) -> Vec<StreamSample> {
        (0..n)
            .map(|i| StreamSample {
                activity_id: id,
                timestamp: start() + Duration::seconds(i),
                elapsed_seconds: i as f64,
                latitude: None,
                longitude: None,
                distance: Some(i as f64 * 3.0),
                speed: Some(3.0),
                enhanced_speed: None,
                pace: Some(5.5556),
                heart_rate: Some(140 + i),
                cadence: Some(0),
                altitude: None,
                enhanced_altitude: None,
                power: None,
                accumulated_power: None,
                temperature: None,
                step_length: None,
                source_format: SourceFormat::Fit,
            })
            .collect()
    }

    #[test]
    fn test_upsert_outcomes() {
        let store = ActivityStore::open_in_memory().unwrap();
        let mut a = activity(1);

        assert_eq!(store.upsert_activity(&a).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert_activity(&a).unwrap(), UpsertOutcome::Unchanged);

        a.activity_name = Some("Renamed".to_string());
        assert_eq!(store.upsert_activity(&a).unwrap(), UpsertOutcome::Updated);

        let rows = store.list_activities(&ActivityFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity_name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_update_keeps_created_at() {
        let store = ActivityStore::open_in_memory().unwrap();
        let mut a = activity(1);
        store.upsert_activity(&a).unwrap();
        store
            .conn
            .execute(
                "UPDATE activities SET created_at = '2000-01-01 00:00:00', updated_at = '2000-01-01 00:00:00'",
                [],
            )
            .unwrap();

        a.calories = Some(300);
        store.upsert_activity(&a).unwrap();

        let (created, updated): (String, String) = store
            .conn
            .query_row(
                "SELECT created_at, updated_at FROM activities WHERE activity_id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(created, "2000-01-01 00:00:00");
        assert_ne!(updated, "2000-01-01 00:00:00");
    }

    #[test]
    fn test_list_order_and_filter() {
        let store = ActivityStore::open_in_memory().unwrap();
        let mut ride = activity(3);
        ride.activity_type = Some("Ride".to_string());
        store
            .upsert_activities(&[activity(1), activity(2), ride])
            .unwrap();

        let ids: Vec<i64> = store
            .list_activities(&ActivityFilter::default())
            .unwrap()
            .iter()
            .map(|r| r.activity_id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let runs = store
            .list_activities(&ActivityFilter {
                limit: Some(1),
                ..ActivityFilter::of_type("Run")
            })
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].activity_id, 2);
        assert_eq!(runs[0].distance_km, Some(5.0));
        assert!((runs[0].pace_decimal.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_list_date_range_inclusive() {
        let store = ActivityStore::open_in_memory().unwrap();
        store
            .upsert_activities(&[activity(1), activity(2), activity(3)])
            .unwrap();

        let ids = |filter: ActivityFilter| -> Vec<i64> {
            store
                .list_activities(&filter)
                .unwrap()
                .iter()
                .map(|r| r.activity_id)
                .collect()
        };
        // activities fall on June 2nd, 3rd and 4th
        let june = |d| NaiveDate::from_ymd_opt(2024, 6, d);
        assert_eq!(
            ids(ActivityFilter {
                since: june(3),
                ..Default::default()
            }),
            vec![3, 2]
        );
        assert_eq!(
            ids(ActivityFilter {
                until: june(3),
                ..Default::default()
            }),
            vec![2, 1]
        );
        assert_eq!(
            ids(ActivityFilter {
                since: june(3),
                until: june(3),
                ..Default::default()
            }),
            vec![2]
        );
        assert!(ids(ActivityFilter {
            since: june(5),
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn test_replace_streams() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();

        let first = store.replace_streams(1, "1.fit", &samples(1, 5)).unwrap();
        assert_eq!(
            first,
            StreamOutcome::Replaced {
                rows: 5,
                previous: false
            }
        );
        assert_eq!(
            store.replace_streams(1, "1.fit", &samples(1, 5)).unwrap(),
            StreamOutcome::Unchanged
        );

        let second = store.replace_streams(1, "1.fit", &samples(1, 3)).unwrap();
        assert_eq!(
            second,
            StreamOutcome::Replaced {
                rows: 3,
                previous: true
            }
        );
        let stream = store.get_activity_stream(1).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream[0].heart_rate, Some(140));
        assert_eq!(stream[0].source_type, "FIT");
        assert!(store.has_streams(1).unwrap());
    }

    #[test]
    fn test_streams_need_parent_activity() {
        let store = ActivityStore::open_in_memory().unwrap();
        assert_eq!(
            store.replace_streams(9, "9.tcx", &samples(9, 2)).unwrap(),
            StreamOutcome::MissingActivity
        );
        assert_eq!(store.stats().unwrap().total_stream_records, 0);
        assert_eq!(
            store.replace_streams(9, "9.tcx", &[]).unwrap(),
            StreamOutcome::Empty
        );
    }

    #[test]
    fn test_delete_cascades() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();
        store.replace_streams(1, "1.fit", &samples(1, 4)).unwrap();

        assert!(store.delete_activity(1).unwrap());
        assert!(!store.delete_activity(1).unwrap());

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_activities, 0);
        assert_eq!(stats.activities_with_streams, 0);
        assert_eq!(stats.total_stream_records, 0);
    }

    #[test]
    fn test_generation_moves_on_writes_only() {
        let store = ActivityStore::open_in_memory().unwrap();
        let v0 = store.version();
        store.upsert_activity(&activity(1)).unwrap();
        let v1 = store.version();
        assert_ne!(v0, v1);

        store.upsert_activity(&activity(1)).unwrap();
        store.list_activities(&ActivityFilter::default()).unwrap();
        assert_eq!(store.version(), v1);
    }

    #[test]
    fn test_stats_and_summary() {
        let store = ActivityStore::open_in_memory().unwrap();
        let mut ride = activity(3);
        ride.activity_type = Some("Ride".to_string());
        store
            .upsert_activities(&[activity(1), activity(2), ride])
            .unwrap();
        store.replace_streams(2, "2.fit", &samples(2, 3)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.activities_with_streams, 1);
        assert_eq!(stats.total_stream_records, 3);
        assert_eq!(stats.first_activity.as_deref(), Some("2024-06-02T06:30:00Z"));
        assert_eq!(stats.activity_types[0].activity_type, "Run");
        assert_eq!(stats.activity_types[0].activity_count, 2);
        assert_eq!(stats.activity_types[0].total_distance_km, Some(10.0));

        let streamed = store.list_activities_with_streams().unwrap();
        assert_eq!(streamed.len(), 1);
        assert_eq!(streamed[0].activity_id, 2);
        assert_eq!(streamed[0].sample_count, 3);
    }

    #[test]
    fn test_activity_start_round_trip() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();
        assert_eq!(
            store.activity_start(1).unwrap(),
            Some(start() + Duration::days(1))
        );
        assert_eq!(store.activity_start(2).unwrap(), None);
    }
}

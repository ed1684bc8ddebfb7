//! SQLite schema definition
//!
//! - activities: one row per workout from the export, keyed by the source id
//! - activity_streams: time-series rows, cascade-deleted with their activity
//! - stream_sets: one row per imported track file, holds the stream fingerprint
//! - views: activities_with_streams, activity_type_summary

pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- ============================================
-- ACTIVITIES
-- ============================================

CREATE TABLE IF NOT EXISTS activities (
    activity_id INTEGER PRIMARY KEY,       -- source-assigned, immutable
    activity_date DATETIME NOT NULL,       -- RFC 3339, UTC
    activity_name TEXT,
    activity_type TEXT,                    -- 'Run', 'Ride', ...
    activity_description TEXT,
    elapsed_time INTEGER,                  -- seconds
    moving_time INTEGER,                   -- seconds
    distance REAL,                         -- meters
    max_speed REAL,
    average_speed REAL,
    elevation_gain REAL,
    elevation_loss REAL,
    elevation_low REAL,
    elevation_high REAL,
    max_grade REAL,
    average_grade REAL,
    max_heart_rate INTEGER,
    average_heart_rate INTEGER,
    max_cadence INTEGER,
    average_cadence INTEGER,
    max_watts INTEGER,
    average_watts INTEGER,
    weighted_average_power INTEGER,
    calories INTEGER,
    relative_effort INTEGER,               -- opaque, imported as-is
    total_work INTEGER,
    max_temperature REAL,
    average_temperature REAL,
    athlete_weight REAL,
    commute BOOLEAN,
    gear TEXT,
    filename TEXT,
    content_hash TEXT NOT NULL,            -- sha256 of the imported record
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- ============================================
-- STREAMS
-- ============================================

CREATE TABLE IF NOT EXISTS stream_sets (
    activity_id INTEGER PRIMARY KEY,
    source_file TEXT NOT NULL,
    source_format TEXT NOT NULL,           -- 'TCX' | 'FIT'
    sample_count INTEGER NOT NULL,
    content_hash TEXT NOT NULL,            -- sha256 of the normalized rows
    imported_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY(activity_id) REFERENCES activities(activity_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS activity_streams (
    id INTEGER PRIMARY KEY,
    activity_id INTEGER NOT NULL,
    timestamp DATETIME NOT NULL,
    elapsed_seconds REAL NOT NULL,
    latitude REAL,
    longitude REAL,
    distance REAL,                         -- cumulative meters
    speed REAL,                            -- m/s, enhanced when available
    enhanced_speed REAL,
    pace REAL,                             -- min/km
    heart_rate INTEGER,
    cadence INTEGER,
    altitude REAL,                         -- meters, enhanced when available
    enhanced_altitude REAL,
    power INTEGER,
    accumulated_power INTEGER,
    temperature REAL,
    step_length REAL,                      -- meters
    source_type TEXT NOT NULL,             -- 'TCX' | 'FIT'
    FOREIGN KEY(activity_id) REFERENCES activities(activity_id) ON DELETE CASCADE
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(activity_date DESC);
CREATE INDEX IF NOT EXISTS idx_activities_type ON activities(activity_type);
CREATE INDEX IF NOT EXISTS idx_streams_activity_time ON activity_streams(activity_id, timestamp);

-- ============================================
-- VIEWS
-- ============================================

CREATE VIEW IF NOT EXISTS activities_with_streams AS
SELECT a.activity_id, a.activity_date, a.activity_name, a.activity_type,
       a.distance, a.moving_time, a.elapsed_time,
       s.source_format, s.sample_count
FROM activities a
JOIN stream_sets s ON s.activity_id = a.activity_id;

CREATE VIEW IF NOT EXISTS activity_type_summary AS
SELECT activity_type,
       COUNT(*) AS activity_count,
       SUM(distance) AS total_distance,
       SUM(moving_time) AS total_moving_time,
       AVG(average_heart_rate) AS average_heart_rate,
       MIN(activity_date) AS first_activity,
       MAX(activity_date) AS last_activity
FROM activities
WHERE activity_type IS NOT NULL
GROUP BY activity_type;
"#;

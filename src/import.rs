//! Import pipeline: export rows and track files into the store
//!
//! Row- and file-level problems are logged and counted; the batch carries on.
//! Store errors abort the run.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::DistanceUnit;
use crate::error::TrackError;
use crate::model::SourceFormat;
use crate::normalize::normalize;
use crate::store::{ActivityStore, StreamOutcome, UpsertOutcome};
use crate::summary::ExportReader;
use crate::track::{activity_id_from_path, discover, format_from_name, TrackFile};

/// Counts for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub activities_inserted: usize,
    pub activities_updated: usize,
    pub activities_unchanged: usize,
    pub activities_rejected: usize,
    pub files_imported: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub files_empty: usize,
    pub files_failed: usize,
    pub samples_written: usize,
    /// Samples stamped before their activity start, clamped to zero
    pub samples_suspect: usize,
    /// Samples dropped for lack of a timestamp
    pub samples_untimed: usize,
}

impl ImportReport {
    pub fn merge(&mut self, other: &ImportReport) {
        self.activities_inserted += other.activities_inserted;
        self.activities_updated += other.activities_updated;
        self.activities_unchanged += other.activities_unchanged;
        self.activities_rejected += other.activities_rejected;
        self.files_imported += other.files_imported;
        self.files_unchanged += other.files_unchanged;
        self.files_skipped += other.files_skipped;
        self.files_empty += other.files_empty;
        self.files_failed += other.files_failed;
        self.samples_written += other.samples_written;
        self.samples_suspect += other.samples_suspect;
        self.samples_untimed += other.samples_untimed;
    }

    /// True when the run changed the store
    pub fn wrote_anything(&self) -> bool {
        self.activities_inserted + self.activities_updated + self.files_imported > 0
    }
}

/// What happened to one track file
#[derive(Debug)]
pub enum TrackOutcome {
    /// Parsed and handed to the store
    Stored {
        outcome: StreamOutcome,
        suspect: usize,
        untimed: usize,
    },
    Skipped,
    Failed(TrackError),
    /// The owning activity is not in the store
    Orphan(i64),
}

/// Read the activity export and upsert every valid row
pub fn import_activities(
    store: &ActivityStore,
    csv_path: &Path,
    unit: DistanceUnit,
) -> Result<ImportReport> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open export {}", csv_path.display()))?;
    let reader = ExportReader::new(file, unit)
        .with_context(|| format!("Failed to read header of {}", csv_path.display()))?;

    let mut report = ImportReport::default();
    let mut activities = Vec::new();
    for result in reader {
        match result {
            Ok(activity) => activities.push(activity),
            Err(e) => {
                tracing::warn!(file = %csv_path.display(), "Skipping row: {}", e);
                report.activities_rejected += 1;
            }
        }
    }

    for outcome in store.upsert_activities(&activities)? {
        match outcome {
            UpsertOutcome::Inserted => report.activities_inserted += 1,
            UpsertOutcome::Updated => report.activities_updated += 1,
            UpsertOutcome::Unchanged => report.activities_unchanged += 1,
        }
    }

    tracing::info!(
        inserted = report.activities_inserted,
        updated = report.activities_updated,
        unchanged = report.activities_unchanged,
        rejected = report.activities_rejected,
        "Activity import finished"
    );
    Ok(report)
}

/// Import every track file in `dir`, one file per activity
pub fn import_streams(store: &ActivityStore, dir: &Path, skip_existing: bool) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Activities directory not found; no streams imported");
        return Ok(report);
    }

    let found = discover(dir);
    report.files_failed += found.unreadable;

    let (files, shadowed) = select_tracks(found.files);
    for path in &shadowed {
        tracing::warn!(
            file = %path.display(),
            "Another track file for this activity takes precedence; skipped"
        );
    }
    report.files_skipped += shadowed.len();
    tracing::info!(dir = %dir.display(), files = files.len(), "Importing track files");

    for path in &files {
        match import_track(store, path, skip_existing)? {
            TrackOutcome::Stored {
                outcome,
                suspect,
                untimed,
            } => {
                report.samples_suspect += suspect;
                report.samples_untimed += untimed;
                match outcome {
                    StreamOutcome::Replaced { rows, previous } => {
                        tracing::debug!(file = %path.display(), rows, previous, "Stream stored");
                        report.files_imported += 1;
                        report.samples_written += rows;
                    }
                    StreamOutcome::Unchanged => {
                        tracing::debug!(file = %path.display(), "Stream unchanged");
                        report.files_unchanged += 1;
                    }
                    StreamOutcome::Empty => {
                        tracing::warn!(file = %path.display(), "No timed samples; existing stream kept");
                        report.files_empty += 1;
                    }
                    StreamOutcome::MissingActivity => {
                        tracing::warn!(file = %path.display(), "No activity for this track file");
                        report.files_failed += 1;
                    }
                }
            }
            TrackOutcome::Orphan(activity_id) => {
                tracing::warn!(file = %path.display(), activity_id, "No activity for this track file");
                report.files_failed += 1;
            }
            TrackOutcome::Skipped => {
                tracing::debug!(file = %path.display(), "Streams already present; skipped");
                report.files_skipped += 1;
            }
            TrackOutcome::Failed(e) => {
                tracing::warn!(file = %path.display(), "Failed to import track file: {}", e);
                report.files_failed += 1;
            }
        }
    }

    tracing::info!(
        imported = report.files_imported,
        unchanged = report.files_unchanged,
        skipped = report.files_skipped,
        failed = report.files_failed,
        samples = report.samples_written,
        suspect = report.samples_suspect,
        "Stream import finished"
    );
    Ok(report)
}

/// One track file per activity: FIT before TCX, then path order
///
/// Returns the chosen files in path order and the ones set aside. Files
/// without an activity id are kept so they are reported as failures.
pub fn select_tracks(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut chosen: BTreeMap<i64, PathBuf> = BTreeMap::new();
    let mut unnamed = Vec::new();
    let mut shadowed = Vec::new();

    for path in files {
        let Ok(activity_id) = activity_id_from_path(&path) else {
            unnamed.push(path);
            continue;
        };
        match chosen.get_mut(&activity_id) {
            None => {
                chosen.insert(activity_id, path);
            }
            Some(current) => {
                let better = (precedence(&path), &path) < (precedence(current), &*current);
                if better {
                    shadowed.push(std::mem::replace(current, path));
                } else {
                    shadowed.push(path);
                }
            }
        }
    }

    let mut selected: Vec<PathBuf> = chosen.into_values().chain(unnamed).collect();
    selected.sort();
    shadowed.sort();
    (selected, shadowed)
}

fn precedence(path: &Path) -> u8 {
    match format_from_name(path) {
        Some(SourceFormat::Fit) => 0,
        _ => 1,
    }
}

/// Parse, normalize and store one track file
///
/// The outer `Result` is for store failures; anything wrong with the file
/// itself comes back as `TrackOutcome::Failed`.
pub fn import_track(store: &ActivityStore, path: &Path, skip_existing: bool) -> Result<TrackOutcome> {
    let activity_id = match activity_id_from_path(path) {
        Ok(id) => id,
        Err(e) => return Ok(TrackOutcome::Failed(e)),
    };

    if skip_existing && store.has_streams(activity_id)? {
        return Ok(TrackOutcome::Skipped);
    }

    let Some(start) = store.activity_start(activity_id)? else {
        return Ok(TrackOutcome::Orphan(activity_id));
    };

    let parsed = TrackFile::open(path)
        .and_then(|file| file.samples().map(|raw| (file.format(), raw)));
    let (format, raw) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return Ok(TrackOutcome::Failed(e)),
    };

    let stream = normalize(activity_id, start, format, raw);
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let outcome = store.replace_streams(activity_id, &source_file, &stream.samples)?;
    Ok(TrackOutcome::Stored {
        outcome,
        suspect: stream.suspect,
        untimed: stream.untimed,
    })
}

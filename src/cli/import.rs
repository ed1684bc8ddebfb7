//! Import commands

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::import::{import_activities, import_streams, ImportReport};
use crate::query::QueryLayer;

/// Command-line overrides for the configured import sources
#[derive(Debug, Default)]
pub struct ImportOptions {
    pub csv: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub skip_existing: bool,
}

impl ImportOptions {
    fn csv(&self, config: &Config) -> PathBuf {
        self.csv.clone().unwrap_or_else(|| config.activities_csv())
    }

    fn dir(&self, config: &Config) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| config.activities_dir())
    }

    fn skip_existing(&self, config: &Config) -> bool {
        self.skip_existing || config.import.skip_existing_streams
    }
}

/// Summaries, then streams, then database statistics
pub fn all(queries: &QueryLayer, config: &Config, options: &ImportOptions) -> Result<()> {
    let store = queries.store();
    let mut report = import_activities(store, &options.csv(config), config.import.distance_unit)?;
    println!("✅ Activities imported");

    let streams = import_streams(store, &options.dir(config), options.skip_existing(config))?;
    println!("✅ Streams imported");
    report.merge(&streams);

    queries.invalidate();
    println!();
    print_report(&report);
    println!();
    super::stats::run(queries)
}

pub fn activities(queries: &QueryLayer, config: &Config, options: &ImportOptions) -> Result<()> {
    let csv = options.csv(config);
    println!("Importing activities from {}...\n", csv.display());

    let report = import_activities(queries.store(), &csv, config.import.distance_unit)?;
    queries.invalidate();
    print_report(&report);
    Ok(())
}

pub fn streams(queries: &QueryLayer, config: &Config, options: &ImportOptions) -> Result<()> {
    let dir = options.dir(config);
    println!("Importing track files from {}...\n", dir.display());

    let report = import_streams(queries.store(), &dir, options.skip_existing(config))?;
    queries.invalidate();
    print_report(&report);
    Ok(())
}

fn print_report(report: &ImportReport) {
    println!("📊 Import Summary");
    println!("{}", "-".repeat(40));
    println!(
        "Activities:  {} new, {} updated, {} unchanged, {} rejected",
        report.activities_inserted,
        report.activities_updated,
        report.activities_unchanged,
        report.activities_rejected
    );
    println!(
        "Track files: {} imported, {} unchanged, {} skipped, {} empty, {} failed",
        report.files_imported,
        report.files_unchanged,
        report.files_skipped,
        report.files_empty,
        report.files_failed
    );
    println!("Samples:     {}", report.samples_written);
    if report.samples_suspect + report.samples_untimed > 0 {
        println!(
            "Suspect:     {} before activity start, {} without timestamp",
            report.samples_suspect, report.samples_untimed
        );
    }
}

//! Typed failures for the import pipeline
//!
//! File- and row-level failures are recoverable: the importer logs them and
//! moves on. Store failures travel as `anyhow::Error` and end the run.

use std::path::PathBuf;
use thiserror::Error;

/// A track file that could not be turned into samples
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {path}: {source}")]
    Gzip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognised track format: {0}")]
    UnknownFormat(PathBuf),

    #[error("no activity id in file name: {0}")]
    NoActivityId(PathBuf),

    #[error("invalid TCX document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid FIT file: {0}")]
    Fit(String),
}

/// An export row that cannot become an activity
#[derive(Error, Debug, PartialEq)]
pub enum RowError {
    #[error("row {row}: unreadable record: {message}")]
    Malformed { row: usize, message: String },

    #[error("row {row}: missing {column}")]
    Missing { row: usize, column: &'static str },

    #[error("row {row}: invalid {column} '{value}'")]
    Invalid {
        row: usize,
        column: &'static str,
        value: String,
    },
}

//! Track-file adapters
//!
//! Two formats are understood:
//! - TCX: Training Center XML, human-readable, physiological fields optional
//! - FIT: compact binary, may carry enhanced speed/altitude next to legacy fields
//!
//! The format is decided once, when the file is opened, and the resulting
//! `TrackFile` hands its samples to the normalizer in file order.

mod fit;
mod tcx;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::TrackError;
use crate::model::SourceFormat;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A reading as the source format exposes it; absent fields stay `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<f64>,
    pub speed: Option<f64>,
    pub enhanced_speed: Option<f64>,
    pub altitude: Option<f64>,
    pub enhanced_altitude: Option<f64>,
    pub heart_rate: Option<i64>,
    pub cadence: Option<i64>,
    pub power: Option<i64>,
    pub accumulated_power: Option<i64>,
    pub temperature: Option<f64>,
    pub step_length: Option<f64>,
}

/// A decoded (decompressed) track file, tagged by format
#[derive(Debug)]
pub enum TrackFile {
    Tcx(Vec<u8>),
    Fit(Vec<u8>),
}

impl TrackFile {
    /// Read, decompress and sniff a track file
    pub fn open(path: &Path) -> Result<Self, TrackError> {
        let raw = std::fs::read(path).map_err(|source| TrackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes = if raw.starts_with(&GZIP_MAGIC) {
            let mut out = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut out)
                .map_err(|source| TrackError::Gzip {
                    path: path.to_path_buf(),
                    source,
                })?;
            out
        } else {
            raw
        };

        let format = sniff(&bytes)
            .or_else(|| format_from_name(path))
            .ok_or_else(|| TrackError::UnknownFormat(path.to_path_buf()))?;

        Ok(Self::from_bytes(format, bytes))
    }

    pub fn from_bytes(format: SourceFormat, bytes: Vec<u8>) -> Self {
        match format {
            SourceFormat::Tcx => TrackFile::Tcx(bytes),
            SourceFormat::Fit => TrackFile::Fit(bytes),
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            TrackFile::Tcx(_) => SourceFormat::Tcx,
            TrackFile::Fit(_) => SourceFormat::Fit,
        }
    }

    /// Samples in file order
    pub fn samples(&self) -> Result<Vec<RawSample>, TrackError> {
        match self {
            TrackFile::Tcx(bytes) => tcx::parse(bytes),
            TrackFile::Fit(bytes) => fit::parse(bytes),
        }
    }
}

/// Identify a format from (decompressed) content
pub fn sniff(bytes: &[u8]) -> Option<SourceFormat> {
    // FIT header: size byte, protocol, profile (2), data size (4), ".FIT"
    if bytes.len() >= 12 && &bytes[8..12] == b".FIT" {
        return Some(SourceFormat::Fit);
    }
    let text_start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace() && *b != 0xEF && *b != 0xBB && *b != 0xBF)?;
    if bytes[text_start] == b'<' {
        return Some(SourceFormat::Tcx);
    }
    None
}

/// Identify a format from the file name, looking through a `.gz` suffix
pub fn format_from_name(path: &Path) -> Option<SourceFormat> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tcx") {
        Some(SourceFormat::Tcx)
    } else if name.ends_with(".fit") {
        Some(SourceFormat::Fit)
    } else {
        None
    }
}

/// Leading numeric part of the file name: `12345.fit.gz` → 12345
pub fn activity_id_from_path(path: &Path) -> Result<i64, TrackError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .and_then(|stem| stem.parse::<i64>().ok())
        .ok_or_else(|| TrackError::NoActivityId(path.to_path_buf()))
}

/// Track files found under a directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Sorted by path
    pub files: Vec<PathBuf>,
    /// Entries that could not be read
    pub unreadable: usize,
}

/// Scan `dir` (not recursively) for track files
pub fn discover(dir: &Path) -> Discovery {
    let mut found = Discovery::default();
    for entry in walkdir::WalkDir::new(dir).max_depth(1) {
        match entry {
            Ok(e) if e.file_type().is_file() => {
                let path = e.into_path();
                if format_from_name(&path).is_some() {
                    found.files.push(path);
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    path = %err.path().unwrap_or(dir).display(),
                    "Unreadable entry skipped: {}",
                    err
                );
                found.unreadable += 1;
            }
        }
    }
    found.files.sort();
    found
}

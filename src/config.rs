//! Configuration management with YAML support

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::ZoneConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub zones: ZoneConfig,

    #[serde(default)]
    pub races: RaceConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Unit of the export's distance column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Meters,
}

impl DistanceUnit {
    /// Factor that converts a value in this unit to meters
    pub fn to_meters(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Meters => 1.0,
        }
    }
}

/// Import sources and behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_activities_csv")]
    pub activities_csv: String,

    #[serde(default = "default_activities_dir")]
    pub activities_dir: String,

    #[serde(default)]
    pub distance_unit: DistanceUnit,

    #[serde(default)]
    pub skip_existing_streams: bool,
}

/// One standard race distance window, in kilometers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCategory {
    pub name: String,
    pub min_km: f64,
    pub max_km: f64,
}

/// Race analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    #[serde(default = "default_race_categories")]
    pub categories: Vec<RaceCategory>,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

// Default value functions
fn default_database_path() -> String {
    "~/.local/share/trainlog/trainlog.db".to_string()
}

fn default_activities_csv() -> String {
    "data/activities.csv".to_string()
}

fn default_activities_dir() -> String {
    "data/activities".to_string()
}

fn default_top_n() -> usize {
    3
}

fn default_race_categories() -> Vec<RaceCategory> {
    [
        ("5k", 4.9, 5.15),
        ("10k", 9.9, 10.3),
        ("Half Marathon", 21.0, 21.5),
        ("Marathon", 42.0, 43.0),
    ]
    .into_iter()
    .map(|(name, min_km, max_km)| RaceCategory {
        name: name.to_string(),
        min_km,
        max_km,
    })
    .collect()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            activities_csv: default_activities_csv(),
            activities_dir: default_activities_dir(),
            distance_unit: DistanceUnit::default(),
            skip_existing_streams: false,
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            categories: default_race_categories(),
            top_n: default_top_n(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./trainlog.yaml (current directory)
    /// 3. ~/.config/trainlog/trainlog.yaml
    pub fn load(path: &str) -> Result<Self> {
        let search_paths = vec![
            shellexpand::tilde(path).to_string(),
            "trainlog.yaml".to_string(),
            shellexpand::tilde("~/.config/trainlog/trainlog.yaml").to_string(),
        ];

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                config.validate()?;
                tracing::debug!(path = %search_path, "Loaded configuration");
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Reject settings that would make zone or race analysis meaningless
    pub fn validate(&self) -> Result<()> {
        self.zones.validate()?;
        for cat in &self.races.categories {
            if cat.min_km > cat.max_km {
                bail!(
                    "race category '{}' has min_km {} above max_km {}",
                    cat.name,
                    cat.min_km,
                    cat.max_km
                );
            }
        }
        Ok(())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        expand(&self.database.path)
    }

    pub fn activities_csv(&self) -> PathBuf {
        expand(&self.import.activities_csv)
    }

    pub fn activities_dir(&self) -> PathBuf {
        expand(&self.import.activities_dir)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

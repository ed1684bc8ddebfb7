//! Heart-rate zones
//!
//! Zones are bounded by four inclusive upper limits; anything above the
//! fourth limit is zone 5. The limits come from configuration and are passed
//! to every computation explicitly.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::store::{ActivityRow, StreamRow};

/// Upper bpm limits of zones 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_z1")]
    pub z1: i64,
    #[serde(default = "default_z2")]
    pub z2: i64,
    #[serde(default = "default_z3")]
    pub z3: i64,
    #[serde(default = "default_z4")]
    pub z4: i64,
}

fn default_z1() -> i64 {
    145
}

fn default_z2() -> i64 {
    164
}

fn default_z3() -> i64 {
    174
}

fn default_z4() -> i64 {
    188
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            z1: default_z1(),
            z2: default_z2(),
            z3: default_z3(),
            z4: default_z4(),
        }
    }
}

impl ZoneConfig {
    pub fn limits(&self) -> [i64; 4] {
        [self.z1, self.z2, self.z3, self.z4]
    }

    pub fn validate(&self) -> Result<()> {
        let limits = self.limits();
        if limits.windows(2).any(|w| w[0] >= w[1]) {
            bail!("zone limits must be strictly increasing, got {:?}", limits);
        }
        Ok(())
    }

    /// Zone 1..=5 for a heart rate
    pub fn zone_for(&self, bpm: i64) -> Zone {
        let idx = self
            .limits()
            .iter()
            .position(|limit| bpm <= *limit)
            .unwrap_or(4);
        Zone(idx as u8 + 1)
    }

    /// Human-readable bpm range of a zone, e.g. `146-164`
    pub fn range_label(&self, zone: Zone) -> String {
        let limits = self.limits();
        match zone.0 {
            1 => format!("<={}", limits[0]),
            n @ 2..=4 => format!("{}-{}", limits[n as usize - 2] + 1, limits[n as usize - 1]),
            _ => format!(">{}", limits[3]),
        }
    }
}

/// A heart-rate zone number, 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Zone(pub u8);

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z{}", self.0)
    }
}

/// Time and distance accumulated per zone, indexed by zone - 1
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoneDistribution {
    pub seconds: [f64; 5],
    pub meters: [f64; 5],
    /// Time that could not be attributed to a zone (no heart rate)
    pub unzoned_seconds: f64,
}

impl ZoneDistribution {
    fn add(&mut self, zone: Zone, seconds: f64, meters: f64) {
        let idx = (zone.0 - 1) as usize;
        self.seconds[idx] += seconds;
        self.meters[idx] += meters;
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds.iter().sum()
    }

    /// Share of zoned time spent in each zone, in percent
    pub fn percentages(&self) -> [f64; 5] {
        let total = self.total_seconds();
        let mut out = [0.0; 5];
        if total > 0.0 {
            for (o, s) in out.iter_mut().zip(self.seconds.iter()) {
                *o = s / total * 100.0;
            }
        }
        out
    }
}

/// Time and distance in zones over one activity's stream
///
/// Each sample contributes the time and distance since the previous sample
/// to the zone of its own heart rate.
pub fn stream_zones(stream: &[StreamRow], zones: &ZoneConfig) -> ZoneDistribution {
    let mut dist = ZoneDistribution::default();
    for pair in stream.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let dt = (cur.elapsed_seconds - prev.elapsed_seconds).max(0.0);
        let dd = match (prev.distance, cur.distance) {
            (Some(a), Some(b)) => (b - a).max(0.0),
            _ => 0.0,
        };
        match cur.heart_rate {
            Some(bpm) => dist.add(zones.zone_for(bpm), dt, dd),
            None => dist.unzoned_seconds += dt,
        }
    }
    dist
}

/// Moving time and distance across activities, by the zone of their average heart rate
pub fn activity_zones(activities: &[ActivityRow], zones: &ZoneConfig) -> ZoneDistribution {
    let mut dist = ZoneDistribution::default();
    for a in activities {
        let seconds = a.moving_time.unwrap_or(0) as f64;
        let meters = a.distance_km.unwrap_or(0.0) * 1000.0;
        match a.average_heart_rate {
            Some(bpm) => dist.add(zones.zone_for(bpm), seconds, meters),
            None => dist.unzoned_seconds += seconds,
        }
    }
    dist
}

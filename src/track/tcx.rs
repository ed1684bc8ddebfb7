//! TCX (Training Center XML) adapter
//!
//! Trackpoints live at Activities/Activity/Lap/Track/Trackpoint. Speed, power
//! and run cadence, when recorded, sit in the Garmin `TPX` extension. Element
//! names are matched on their local part so any namespace prefix works.

use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::{Document, Node};

use super::RawSample;
use crate::error::TrackError;

pub(super) fn parse(bytes: &[u8]) -> Result<Vec<RawSample>, TrackError> {
    let text = String::from_utf8_lossy(bytes);
    // Garmin exports sometimes carry whitespace or a BOM before the declaration
    let text = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let doc = Document::parse(text)?;

    let samples = doc
        .descendants()
        .filter(|n| is(n, "Trackpoint"))
        .map(|tp| trackpoint(&tp))
        .collect();
    Ok(samples)
}

fn trackpoint(tp: &Node) -> RawSample {
    let position = child(tp, "Position");
    let tpx = child(tp, "Extensions").and_then(|ext| child(&ext, "TPX"));

    RawSample {
        timestamp: text(tp, "Time").and_then(parse_time),
        latitude: position.as_ref().and_then(|p| number(p, "LatitudeDegrees")),
        longitude: position.as_ref().and_then(|p| number(p, "LongitudeDegrees")),
        distance: number(tp, "DistanceMeters"),
        speed: tpx.as_ref().and_then(|x| number(x, "Speed")),
        altitude: number(tp, "AltitudeMeters"),
        heart_rate: child(tp, "HeartRateBpm")
            .and_then(|hr| number(&hr, "Value"))
            .map(|v| v.round() as i64),
        cadence: number(tp, "Cadence")
            .or_else(|| tpx.as_ref().and_then(|x| number(x, "RunCadence")))
            .map(|v| v.round() as i64),
        power: tpx
            .as_ref()
            .and_then(|x| number(x, "Watts"))
            .map(|v| v.round() as i64),
        ..RawSample::default()
    }
}

fn is(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is(c, name))
}

fn text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn number(node: &Node, name: &str) -> Option<f64> {
    text(node, name).and_then(|s| s.parse::<f64>().ok())
}

/// RFC 3339, or a naive timestamp taken as UTC
fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => Some(dt.and_utc()),
        Err(_) => {
            tracing::debug!(value = s, "Unparseable trackpoint time");
            None
        }
    }
}

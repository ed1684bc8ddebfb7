//! Command implementations; each prints plain text to stdout

pub mod delete;
pub mod import;
pub mod list;
pub mod races;
pub mod runs;
pub mod show;
pub mod stats;
pub mod weekly;
pub mod zones;

/// Cut a display string to `max` characters
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or(text);
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

/// `YYYY-MM-DD HH:MM` from a stored timestamp
pub(crate) fn short_date(ts: &str) -> String {
    if ts.len() >= 16 {
        format!("{} {}", &ts[..10], &ts[11..16])
    } else {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Morning Run", 20), "Morning Run");
        assert_eq!(truncate("A very long activity name", 10), "A very ...");
        assert_eq!(truncate("first\nsecond", 20), "first");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2024-03-01T07:00:00Z"), "2024-03-01 07:00");
        assert_eq!(short_date("2024"), "2024");
    }
}

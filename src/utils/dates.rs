//! Date and duration formatting helpers

use chrono::{DateTime, Utc};

/// Format a track length as `m:ss`
pub fn format_track_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Convert a timestamp to relative time (e.g., "2 hours ago")
pub fn to_relative(dt: &DateTime<Utc>) -> String {
    chrono_humanize::HumanTime::from(*dt).to_string()
}

/// Convert seconds to human-readable duration (e.g., "1 hr, 30 min")
pub fn seconds_to_human_readable(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{} sec", seconds);
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} min", minutes);
    }

    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    if hours < 24 {
        if remaining_minutes > 0 {
            format!("{} hr, {} min", hours, remaining_minutes)
        } else {
            format!("{} hr", hours)
        }
    } else {
        let days = hours / 24;
        let remaining_hours = hours % 24;
        if remaining_hours > 0 {
            format!("{} days, {} hr", days, remaining_hours)
        } else {
            format!("{} days", days)
        }
    }
}

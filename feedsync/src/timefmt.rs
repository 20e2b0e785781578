//! Relative timestamp rendering for feed entries.

use chrono::{DateTime, Utc};

/// Formats an event time relative to `now`: "just now", "N min ago",
/// "N h ago", "N d ago", then the calendar date past one week.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours} h ago");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return format!("{days} d ago");
    }
    at.format("%Y-%m-%d").to_string()
}

//! Human-readable due labels ("Due now", "Due in 3d").

use chrono::{DateTime, Utc};

/// Describe how far `next_review` lies from `now`.
///
/// Under an hour rounds minutes up, under a day rounds to the nearest
/// hour, otherwise rounds to the nearest day.
pub fn due_label(next_review: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (next_review - now).num_milliseconds();
    if diff_ms <= 0 {
        return "Due now".to_string();
    }

    let hours = diff_ms as f64 / 3_600_000.0;
    if hours < 1.0 {
        format!("Due in {}m", (hours * 60.0).ceil() as i64)
    } else if hours < 24.0 {
        format!("Due in {}h", hours.round() as i64)
    } else {
        format!("Due in {}d", (hours / 24.0).round() as i64)
    }
}

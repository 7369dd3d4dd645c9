use chrono::{DateTime, Utc};

/// Renders a stored timestamp into the display string carried by view models.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y/%m/%d %H:%M").to_string()
}
